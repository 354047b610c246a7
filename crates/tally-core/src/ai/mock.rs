//! Mock backend for testing
//!
//! Three behaviours:
//! - heuristic (default): answers the two Tally prompts with keyword rules, so the
//!   CLI works offline with `AI_BACKEND=mock`
//! - fixed reply: returns the same raw text for every prompt
//! - unavailable: every completion fails like a dead server
//!
//! Every prompt sent is recorded for assertions.

use std::sync::{Arc, Mutex, OnceLock};

use async_trait::async_trait;
use chrono::{Datelike, Duration, NaiveDate};
use regex::Regex;
use serde_json::json;

use crate::error::{Error, Result};
use crate::models::FALLBACK_CATEGORY;
use crate::window::DateWindow;

use super::AIBackend;

const EXPENSE_MARKER: &str = "Expense text:";
const QUERY_MARKER: &str = "Query text:";

#[derive(Clone, Debug)]
enum MockMode {
    Heuristic,
    Fixed(String),
    Unavailable,
}

/// Mock AI backend for testing
#[derive(Clone, Debug)]
pub struct MockBackend {
    /// Whether health_check should return true
    pub healthy: bool,
    mode: MockMode,
    model: String,
    sent: Arc<Mutex<Vec<String>>>,
}

impl Default for MockBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl MockBackend {
    /// Create a new heuristic mock backend (healthy by default)
    pub fn new() -> Self {
        Self {
            healthy: true,
            mode: MockMode::Heuristic,
            model: "mock".to_string(),
            sent: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Always reply with `raw`
    pub fn with_reply(raw: &str) -> Self {
        Self {
            mode: MockMode::Fixed(raw.to_string()),
            ..Self::new()
        }
    }

    /// Create an unhealthy mock backend whose completions fail
    pub fn unhealthy() -> Self {
        Self {
            healthy: false,
            mode: MockMode::Unavailable,
            ..Self::new()
        }
    }

    /// Prompts received so far, oldest first
    pub fn sent_prompts(&self) -> Vec<String> {
        self.sent.lock().map(|s| s.clone()).unwrap_or_default()
    }

    fn record(&self, prompt: &str) {
        if let Ok(mut sent) = self.sent.lock() {
            sent.push(prompt.to_string());
        }
    }
}

#[async_trait]
impl AIBackend for MockBackend {
    async fn complete(&self, prompt: &str) -> Result<String> {
        self.record(prompt);
        match &self.mode {
            MockMode::Fixed(reply) => Ok(reply.clone()),
            MockMode::Unavailable => Err(Error::OracleUnavailable(
                "mock backend is unavailable".to_string(),
            )),
            MockMode::Heuristic => Ok(heuristic_reply(prompt)),
        }
    }

    async fn health_check(&self) -> bool {
        self.healthy
    }

    fn model(&self) -> &str {
        &self.model
    }

    fn host(&self) -> &str {
        "mock://localhost"
    }
}

/// Keyword rules, checked in order
const KEYWORDS: &[(&str, &[&str])] = &[
    (
        "alimentação",
        &[
            "mercado", "supermercado", "almoço", "almoco", "jantar", "restaurante", "lanche",
            "padaria", "ifood", "groceries", "grocery", "lunch", "dinner", "food", "coffee",
        ],
    ),
    (
        "transporte",
        &[
            "uber", "ônibus", "onibus", "gasolina", "combustível", "taxi", "táxi", "metrô",
            "metro", "bus", "gas", "fuel", "transporte",
        ],
    ),
    (
        "moradia",
        &["aluguel", "condomínio", "condominio", "luz", "água", "rent", "electricity", "moradia"],
    ),
    (
        "lazer",
        &["cinema", "show", "netflix", "bar", "festa", "viagem", "movie", "concert", "lazer"],
    ),
    (
        "saúde",
        &["farmácia", "farmacia", "médico", "medico", "remédio", "pharmacy", "doctor", "saúde", "saude"],
    ),
    (
        "educação",
        &["curso", "livro", "escola", "faculdade", "course", "book", "school", "educação", "educacao"],
    ),
    (
        "vestuário",
        &["roupa", "camisa", "sapato", "tênis", "clothes", "shirt", "shoes", "vestuário", "vestuario"],
    ),
];

fn heuristic_reply(prompt: &str) -> String {
    let today = prompt_today(prompt);

    if let Some(text) = marker_text(prompt, EXPENSE_MARKER) {
        return expense_reply(&text, today);
    }
    if let Some(text) = marker_text(prompt, QUERY_MARKER) {
        return query_reply(&text, today);
    }
    "I can only help with expenses.".to_string()
}

fn expense_reply(text: &str, today: Option<NaiveDate>) -> String {
    let lowered = text.to_lowercase();
    let Some(amount) = amount_re()
        .find(&lowered)
        .and_then(|m| m.as_str().replace(',', ".").parse::<f64>().ok())
    else {
        return json!({"erro": "not_an_expense"}).to_string();
    };

    let category = keyword_category(&lowered).unwrap_or(FALLBACK_CATEGORY);
    let mut date = today;
    if lowered.contains("yesterday") || lowered.contains("ontem") {
        date = date.map(|d| d - Duration::days(1));
    }

    json!({
        "valor": amount,
        "tipo": category,
        "data": date.map(|d| d.format("%Y-%m-%d").to_string()),
        "descricao": text.trim(),
    })
    .to_string()
}

fn query_reply(text: &str, today: Option<NaiveDate>) -> String {
    let lowered = text.to_lowercase();
    let category = keyword_category(&lowered);

    let Some(today) = today else {
        return json!({"periodo": "mensal", "tipo": category}).to_string();
    };

    let (period, window) = if lowered.contains("today") || lowered.contains("hoje") {
        ("diário", DateWindow::new(today, today).ok())
    } else if lowered.contains("last month") || lowered.contains("mês passado") {
        ("mensal", Some(DateWindow::previous_month(today)))
    } else if lowered.contains("year") || lowered.contains("ano") {
        ("anual", DateWindow::year(today.year()).ok())
    } else {
        ("mensal", Some(DateWindow::current_month(today)))
    };

    let window = window.unwrap_or_else(|| DateWindow::current_month(today));
    json!({
        "periodo": period,
        "start_date": window.start().format("%Y-%m-%d").to_string(),
        "end_date": window.end().format("%Y-%m-%d").to_string(),
        "tipo": category,
    })
    .to_string()
}

fn keyword_category(lowered: &str) -> Option<&'static str> {
    KEYWORDS
        .iter()
        .find(|(_, words)| {
            lowered
                .split(|c: char| !c.is_alphanumeric())
                .any(|token| words.contains(&token))
        })
        .map(|(category, _)| *category)
}

/// Text following a marker up to the end of its line
fn marker_text(prompt: &str, marker: &str) -> Option<String> {
    let start = prompt.rfind(marker)? + marker.len();
    let rest = &prompt[start..];
    let line = rest.lines().next().unwrap_or("");
    Some(line.trim().to_string())
}

fn prompt_today(prompt: &str) -> Option<NaiveDate> {
    static RE: OnceLock<Regex> = OnceLock::new();
    let re = RE.get_or_init(|| Regex::new(r"Today is (\d{4}-\d{2}-\d{2})").expect("valid regex"));
    let caps = re.captures(prompt)?;
    NaiveDate::parse_from_str(&caps[1], "%Y-%m-%d").ok()
}

fn amount_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\d+(?:[.,]\d{1,2})?").expect("valid regex"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Value;

    fn parse(reply: &str) -> Value {
        serde_json::from_str(reply).unwrap()
    }

    #[tokio::test]
    async fn test_heuristic_expense() {
        let mock = MockBackend::new();
        let reply = mock
            .complete("Today is 2024-03-15.\n# User\nExpense text: gastei 50,90 no mercado")
            .await
            .unwrap();
        let json = parse(&reply);
        assert_eq!(json["valor"], 50.9);
        assert_eq!(json["tipo"], "alimentação");
        assert_eq!(json["data"], "2024-03-15");
    }

    #[tokio::test]
    async fn test_heuristic_expense_yesterday() {
        let mock = MockBackend::new();
        let reply = mock
            .complete("Today is 2024-03-01.\nExpense text: uber 23 yesterday")
            .await
            .unwrap();
        let json = parse(&reply);
        assert_eq!(json["tipo"], "transporte");
        assert_eq!(json["data"], "2024-02-29");
    }

    #[tokio::test]
    async fn test_heuristic_not_an_expense() {
        let mock = MockBackend::new();
        let reply = mock
            .complete("Today is 2024-03-15.\nExpense text: hello there")
            .await
            .unwrap();
        assert!(parse(&reply).get("erro").is_some());
    }

    #[tokio::test]
    async fn test_heuristic_query() {
        let mock = MockBackend::new();
        let reply = mock
            .complete("Today is 2024-03-15.\nQuery text: how much on transporte this year?")
            .await
            .unwrap();
        let json = parse(&reply);
        assert_eq!(json["periodo"], "anual");
        assert_eq!(json["start_date"], "2024-01-01");
        assert_eq!(json["end_date"], "2024-12-31");
        assert_eq!(json["tipo"], "transporte");
    }

    #[tokio::test]
    async fn test_fixed_reply_and_recording() {
        let mock = MockBackend::with_reply("not json");
        assert_eq!(mock.complete("first").await.unwrap(), "not json");
        assert_eq!(mock.complete("second").await.unwrap(), "not json");
        assert_eq!(mock.sent_prompts(), vec!["first", "second"]);
    }

    #[tokio::test]
    async fn test_unhealthy() {
        let mock = MockBackend::unhealthy();
        assert!(!mock.health_check().await);
        assert!(matches!(
            mock.complete("x").await,
            Err(Error::OracleUnavailable(_))
        ));
    }
}
