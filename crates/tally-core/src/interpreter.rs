//! Expense interpreter
//!
//! Turns free-form text into a validated expense draft or into query
//! parameters by rendering a prompt, calling the oracle once, and validating
//! what comes back. The caller's user id is always authoritative.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use chrono::{Datelike, NaiveDate};
use serde_json::{Map, Value};
use tracing::{debug, warn};

use crate::ai::parsing::{
    amount_field, date_field, extract_json_object, string_field, truncate_raw, AmountField,
    DateField,
};
use crate::ai::{AIBackend, AIClient};
use crate::error::{Error, InterpretationError, Result};
use crate::models::{canonical_category, NewExpense, QueryParameters, CATEGORIES, FALLBACK_CATEGORY};
use crate::prompts::{PromptId, PromptLibrary};
use crate::window::DateWindow;

/// Category filter values that mean "every category"
const ALL_CATEGORIES: [&str; 5] = ["todos", "todas", "all", "geral", "null"];

/// Wraps the oracle for the two interpretation tasks
#[derive(Clone)]
pub struct ExpenseInterpreter {
    ai: AIClient,
    prompts: Arc<RwLock<PromptLibrary>>,
}

impl ExpenseInterpreter {
    /// Create an interpreter with the default prompt library (overrides enabled)
    pub fn new(ai: AIClient) -> Self {
        Self::with_prompts(ai, PromptLibrary::new())
    }

    pub fn with_prompts(ai: AIClient, prompts: PromptLibrary) -> Self {
        Self {
            ai,
            prompts: Arc::new(RwLock::new(prompts)),
        }
    }

    /// Interpret a statement as an expense draft
    ///
    /// Never persists anything. Oracle failures, "not an expense" replies and
    /// unusable payloads are reported as [`InterpretationError`]s.
    pub async fn interpret_expense(
        &self,
        text: &str,
        user_id: i64,
        today: NaiveDate,
    ) -> std::result::Result<NewExpense, InterpretationError> {
        let prompt = self
            .render(PromptId::InterpretExpense, text, today)
            .map_err(|e| InterpretationError::OracleUnavailable(e.to_string()))?;

        let raw = self.ai.complete(&prompt).await.map_err(|e| {
            warn!(user_id, error = %e, "Oracle call failed for expense statement");
            InterpretationError::OracleUnavailable(oracle_reason(e))
        })?;
        debug!(user_id, raw = %truncate_raw(&raw), "Oracle expense reply");

        let obj = extract_json_object(&raw).map_err(|e| malformed(&e.to_string(), &raw))?;
        parse_expense(&obj, &raw, text, user_id, today)
    }

    /// Interpret a question as query parameters
    ///
    /// Total: any failure degrades to the current-month window without a
    /// category filter, with `fallback_reason` explaining why.
    pub async fn interpret_query(&self, text: &str, user_id: i64, now: NaiveDate) -> QueryParameters {
        let current = DateWindow::current_month(now);
        let prompt = match self.render(PromptId::InterpretQuery, text, now) {
            Ok(p) => p,
            Err(e) => return fallback_query(user_id, current, format!("prompt unavailable: {}", e)),
        };

        let raw = match self.ai.complete(&prompt).await {
            Ok(raw) => raw,
            Err(e) => {
                warn!(user_id, error = %e, "Oracle call failed for query, using current month");
                return fallback_query(user_id, current, oracle_reason(e));
            }
        };
        debug!(user_id, raw = %truncate_raw(&raw), "Oracle query reply");

        let obj = match extract_json_object(&raw) {
            Ok(obj) => obj,
            Err(e) => {
                warn!(user_id, error = %e, "Malformed query reply, using current month");
                return fallback_query(user_id, current, format!("malformed oracle output: {}", e));
            }
        };

        parse_query(&obj, user_id, current)
    }

    fn render(&self, id: PromptId, text: &str, today: NaiveDate) -> Result<String> {
        let mut prompts = self
            .prompts
            .write()
            .map_err(|_| Error::InvalidData("Failed to acquire prompt library lock".into()))?;
        let template = prompts.get(id)?;
        let values = prompt_variables(id, text, today);
        let vars: HashMap<&str, &str> = values.iter().map(|(k, v)| (*k, v.as_str())).collect();
        Ok(template.render(&vars))
    }
}

/// Values the `id` prompt is rendered with for `text` on `today`
///
/// Keys match [`PromptId::variables`].
pub fn prompt_variables(id: PromptId, text: &str, today: NaiveDate) -> Vec<(&'static str, String)> {
    let iso = |d: NaiveDate| d.format("%Y-%m-%d").to_string();
    let categories = CATEGORIES.join(", ");

    match id {
        PromptId::InterpretExpense => vec![
            ("text", text.to_string()),
            ("today", iso(today)),
            ("categories", categories),
            ("fallback_category", FALLBACK_CATEGORY.to_string()),
        ],
        PromptId::InterpretQuery => {
            let month = DateWindow::current_month(today);
            let year = DateWindow::year(today.year()).unwrap_or(month);
            vec![
                ("text", text.to_string()),
                ("today", iso(today)),
                ("month_start", iso(month.start())),
                ("month_end", iso(month.end())),
                ("year_start", iso(year.start())),
                ("year_end", iso(year.end())),
                ("categories", categories),
            ]
        }
    }
}

fn oracle_reason(err: Error) -> String {
    match err {
        Error::OracleUnavailable(reason) => reason,
        other => other.to_string(),
    }
}

fn malformed(reason: &str, raw: &str) -> InterpretationError {
    InterpretationError::MalformedOracleOutput {
        reason: reason.to_string(),
        raw: raw.to_string(),
    }
}

fn parse_expense(
    obj: &Map<String, Value>,
    raw: &str,
    text: &str,
    user_id: i64,
    today: NaiveDate,
) -> std::result::Result<NewExpense, InterpretationError> {
    if obj.contains_key("erro") || obj.contains_key("error") {
        return Err(InterpretationError::NotAnExpense);
    }

    if let Some(claimed) = obj.get("user_id").filter(|v| !v.is_null()) {
        if claimed.as_i64() != Some(user_id) {
            warn!(user_id, claimed = %claimed, "Ignoring user_id supplied by oracle");
        }
    }

    let amount = match amount_field(obj, "valor") {
        AmountField::Value(v) => v.abs(),
        AmountField::Missing => return Err(malformed("missing amount (valor)", raw)),
        AmountField::Invalid(v) => {
            return Err(malformed(&format!("amount is not a number: {}", v), raw))
        }
    };

    let category = string_field(obj, "tipo")
        .map(|c| canonical_category(&c))
        .unwrap_or_else(|| FALLBACK_CATEGORY.to_string());

    let date = match date_field(obj, "data") {
        DateField::Value(d) => d,
        DateField::Missing => today,
        DateField::Invalid(v) => {
            return Err(malformed(&format!("date is not YYYY-MM-DD: {}", v), raw))
        }
    };

    let description = string_field(obj, "descricao").unwrap_or_else(|| text.to_string());

    Ok(NewExpense {
        user_id,
        amount,
        category,
        date,
        description,
    })
}

fn parse_query(obj: &Map<String, Value>, user_id: i64, current: DateWindow) -> QueryParameters {
    let mut reasons = Vec::new();

    let mut start = match date_field(obj, "start_date") {
        DateField::Value(d) => d,
        DateField::Missing => {
            reasons.push("start_date missing".to_string());
            current.start()
        }
        DateField::Invalid(v) => {
            reasons.push(format!("start_date unparseable: {}", v));
            current.start()
        }
    };
    let mut end = match date_field(obj, "end_date") {
        DateField::Value(d) => d,
        DateField::Missing => {
            reasons.push("end_date missing".to_string());
            current.end()
        }
        DateField::Invalid(v) => {
            reasons.push(format!("end_date unparseable: {}", v));
            current.end()
        }
    };

    if start > end {
        warn!(user_id, %start, %end, "Oracle returned an inverted range, using current month");
        reasons = vec![format!("start_date {} after end_date {}", start, end)];
        start = current.start();
        end = current.end();
    } else if !reasons.is_empty() {
        debug!(user_id, reasons = ?reasons, "Defaulted part of the query window");
    }

    let category = string_field(obj, "tipo")
        .filter(|c| !ALL_CATEGORIES.contains(&c.to_lowercase().as_str()))
        .map(|c| canonical_category(&c));

    QueryParameters {
        user_id,
        start_date: start,
        end_date: end,
        category,
        period: string_field(obj, "periodo"),
        fallback_reason: (!reasons.is_empty()).then(|| reasons.join("; ")),
    }
}

pub(crate) fn fallback_query(user_id: i64, current: DateWindow, reason: String) -> QueryParameters {
    QueryParameters {
        user_id,
        start_date: current.start(),
        end_date: current.end(),
        category: None,
        period: None,
        fallback_reason: Some(reason),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::MockBackend;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn interpreter(reply: &str) -> ExpenseInterpreter {
        ExpenseInterpreter::with_prompts(
            AIClient::Mock(MockBackend::with_reply(reply)),
            PromptLibrary::embedded_only(),
        )
    }

    #[tokio::test]
    async fn test_expense_happy_path() {
        let interp = interpreter(
            r#"{"valor": 50, "tipo": "Alimentação", "data": "2024-03-14", "descricao": "mercado"}"#,
        );
        let draft = interp
            .interpret_expense("gastei 50 no mercado ontem", 7, date(2024, 3, 15))
            .await
            .unwrap();

        assert_eq!(draft.user_id, 7);
        assert_eq!(draft.amount, 50.0);
        assert_eq!(draft.category, "alimentação");
        assert_eq!(draft.date, date(2024, 3, 14));
        assert_eq!(draft.description, "mercado");
    }

    #[tokio::test]
    async fn test_expense_defaults() {
        let interp = interpreter(r#"{"valor": "R$ 12,50"}"#);
        let draft = interp
            .interpret_expense("  coxinha 12,50 ", 1, date(2024, 3, 15))
            .await
            .unwrap();

        assert_eq!(draft.amount, 12.5);
        assert_eq!(draft.category, FALLBACK_CATEGORY);
        assert_eq!(draft.date, date(2024, 3, 15));
        // The statement is kept as typed
        assert_eq!(draft.description, "  coxinha 12,50 ");
    }

    #[tokio::test]
    async fn test_expense_negative_amount_becomes_magnitude() {
        let interp = interpreter(r#"{"valor": -30.5, "tipo": "lazer"}"#);
        let draft = interp
            .interpret_expense("cinema 30,50", 1, date(2024, 3, 15))
            .await
            .unwrap();
        assert_eq!(draft.amount, 30.5);
    }

    #[tokio::test]
    async fn test_expense_ignores_oracle_user_id() {
        let interp = interpreter(r#"{"valor": 10, "user_id": 999}"#);
        let draft = interp
            .interpret_expense("pão 10", 42, date(2024, 3, 15))
            .await
            .unwrap();
        assert_eq!(draft.user_id, 42);
    }

    #[tokio::test]
    async fn test_expense_unknown_category_is_kept() {
        let interp = interpreter(r#"{"valor": 80, "tipo": "Pets"}"#);
        let draft = interp
            .interpret_expense("ração 80", 1, date(2024, 3, 15))
            .await
            .unwrap();
        assert_eq!(draft.category, "pets");
    }

    #[tokio::test]
    async fn test_expense_not_an_expense() {
        for reply in [r#"{"erro": "not_an_expense"}"#, r#"{"error": "no"}"#] {
            let err = interpreter(reply)
                .interpret_expense("hello", 1, date(2024, 3, 15))
                .await
                .unwrap_err();
            assert_eq!(err, InterpretationError::NotAnExpense);
        }
    }

    #[tokio::test]
    async fn test_expense_malformed_carries_raw() {
        let err = interpreter("I am not sure what you mean")
            .interpret_expense("???", 1, date(2024, 3, 15))
            .await
            .unwrap_err();
        assert!(matches!(err, InterpretationError::MalformedOracleOutput { .. }));
        assert_eq!(err.raw_output(), Some("I am not sure what you mean"));
    }

    #[tokio::test]
    async fn test_expense_malformed_fields() {
        let replies = [
            r#"{"tipo": "lazer"}"#,
            r#"{"valor": "fifty"}"#,
            r#"{"valor": 10, "data": "15/03/2024"}"#,
        ];
        for reply in replies {
            let err = interpreter(reply)
                .interpret_expense("x", 1, date(2024, 3, 15))
                .await
                .unwrap_err();
            assert!(
                matches!(err, InterpretationError::MalformedOracleOutput { .. }),
                "reply {} gave {:?}",
                reply,
                err
            );
        }
    }

    #[tokio::test]
    async fn test_expense_oracle_unavailable() {
        let interp = ExpenseInterpreter::with_prompts(
            AIClient::Mock(MockBackend::unhealthy()),
            PromptLibrary::embedded_only(),
        );
        let err = interp
            .interpret_expense("lunch 20", 1, date(2024, 3, 15))
            .await
            .unwrap_err();
        assert!(matches!(err, InterpretationError::OracleUnavailable(_)));
    }

    #[tokio::test]
    async fn test_expense_prompt_contains_text_and_date() {
        let mock = MockBackend::with_reply(r#"{"valor": 1}"#);
        let interp = ExpenseInterpreter::with_prompts(
            AIClient::Mock(mock.clone()),
            PromptLibrary::embedded_only(),
        );
        interp
            .interpret_expense("bus ticket 4.40", 1, date(2024, 3, 15))
            .await
            .unwrap();

        let sent = mock.sent_prompts();
        assert_eq!(sent.len(), 1);
        assert!(sent[0].contains("Expense text: bus ticket 4.40"));
        assert!(sent[0].contains("2024-03-15"));
        assert!(sent[0].contains("vestuário"));
        assert!(!sent[0].contains("{{"));
    }

    #[tokio::test]
    async fn test_query_period_only_defaults_to_current_month() {
        let params = interpreter(r#"{"periodo": "mensal"}"#)
            .interpret_query("what did I spend?", 3, date(2024, 3, 15))
            .await;

        assert_eq!(params.user_id, 3);
        assert_eq!(params.start_date, date(2024, 3, 1));
        assert_eq!(params.end_date, date(2024, 3, 31));
        assert_eq!(params.category, None);
        assert_eq!(params.period.as_deref(), Some("mensal"));
        assert!(params.fallback_reason.is_some());
    }

    #[tokio::test]
    async fn test_query_explicit_range_and_category() {
        let params = interpreter(
            r#"{"periodo": "personalizado", "start_date": "2024-02-10", "end_date": "2024-02-20", "tipo": "Transporte"}"#,
        )
        .interpret_query("transport 10 to 20 Feb", 3, date(2024, 3, 15))
        .await;

        assert_eq!(params.start_date, date(2024, 2, 10));
        assert_eq!(params.end_date, date(2024, 2, 20));
        assert_eq!(params.category.as_deref(), Some("transporte"));
        assert_eq!(params.fallback_reason, None);
    }

    #[tokio::test]
    async fn test_query_single_missing_bound() {
        let params = interpreter(r#"{"start_date": "2024-03-10"}"#)
            .interpret_query("since the 10th", 3, date(2024, 3, 15))
            .await;
        assert_eq!(params.start_date, date(2024, 3, 10));
        assert_eq!(params.end_date, date(2024, 3, 31));
    }

    #[tokio::test]
    async fn test_query_inverted_range_falls_back() {
        let params = interpreter(r#"{"start_date": "2024-03-20", "end_date": "2024-03-01"}"#)
            .interpret_query("weird", 3, date(2024, 3, 15))
            .await;
        assert_eq!(params.start_date, date(2024, 3, 1));
        assert_eq!(params.end_date, date(2024, 3, 31));
        assert!(params.fallback_reason.unwrap().contains("after"));
    }

    #[tokio::test]
    async fn test_query_all_categories_means_no_filter() {
        for tipo in ["null", "\"\"", "\"todos\"", "\"All\"", "\"geral\""] {
            let reply = format!(r#"{{"periodo": "mensal", "tipo": {}}}"#, tipo);
            let params = interpreter(&reply)
                .interpret_query("everything", 3, date(2024, 3, 15))
                .await;
            assert_eq!(params.category, None, "tipo {}", tipo);
        }
    }

    #[tokio::test]
    async fn test_query_failures_fall_back() {
        let malformed = interpreter("no idea")
            .interpret_query("?", 3, date(2024, 3, 15))
            .await;
        assert_eq!(malformed.start_date, date(2024, 3, 1));
        assert!(malformed.fallback_reason.is_some());

        let unavailable = ExpenseInterpreter::with_prompts(
            AIClient::Mock(MockBackend::unhealthy()),
            PromptLibrary::embedded_only(),
        )
        .interpret_query("?", 3, date(2024, 3, 15))
        .await;
        assert_eq!(unavailable.end_date, date(2024, 3, 31));
        assert_eq!(unavailable.category, None);
        assert!(unavailable.fallback_reason.is_some());
    }

    #[test]
    fn test_prompt_variables_cover_declared_names() {
        for id in PromptId::all() {
            let vars = prompt_variables(*id, "uber 25", date(2024, 2, 10));
            let keys: Vec<&str> = vars.iter().map(|(k, _)| *k).collect();
            assert_eq!(keys, id.variables());
        }

        let query = prompt_variables(PromptId::InterpretQuery, "?", date(2024, 2, 10));
        let value = |key: &str| query.iter().find(|(k, _)| *k == key).map(|(_, v)| v.clone());
        assert_eq!(value("month_end").as_deref(), Some("2024-02-29"));
        assert_eq!(value("year_start").as_deref(), Some("2024-01-01"));
    }
}
