//! Prompt commands: inspect what the oracle is asked, and where overrides go

use std::collections::HashMap;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use tally_core::interpreter::prompt_variables;
use tally_core::prompts::{default_prompts_dir, Prompt, PromptId, PromptLibrary};

/// One line per prompt with its source and template variables
pub fn cmd_prompts_list() -> Result<()> {
    let mut library = PromptLibrary::new();

    for &id in PromptId::all() {
        let prompt = library
            .get(id)
            .with_context(|| format!("Failed to load prompt {}", id.as_str()))?;
        let source = if prompt.is_override { "override" } else { "built-in" };
        let variables: Vec<String> = prompt
            .placeholders()
            .iter()
            .map(|name| format!("{{{{{}}}}}", name))
            .collect();

        println!(
            "{} v{} ({}): {}",
            id.as_str(),
            prompt.metadata.version,
            source,
            prompt.metadata.description
        );
        println!("   uses {}", variables.join(" "));
        print_problems(prompt, id);
    }

    println!();
    println!("Preview one with: tally prompts show <id> --text \"gastei 50 no mercado\"");
    Ok(())
}

/// Print a prompt's sections, or the exact text the oracle would receive for `text`
pub fn cmd_prompts_show(prompt_id: &str, text: Option<&str>, today: NaiveDate) -> Result<()> {
    let id: PromptId = match prompt_id.parse() {
        Ok(id) => id,
        Err(_) => {
            let known: Vec<&str> = PromptId::all().iter().map(|id| id.as_str()).collect();
            eprintln!("Unknown prompt '{}'. Known: {}", prompt_id, known.join(", "));
            return Ok(());
        }
    };

    let mut library = PromptLibrary::new();
    let prompt = library.get(id)?;

    match &prompt.override_path {
        Some(path) => println!("{} v{} from {}", id.as_str(), prompt.metadata.version, path.display()),
        None => println!("{} v{} (built-in)", id.as_str(), prompt.metadata.version),
    }
    print_problems(prompt, id);

    match text {
        Some(text) => {
            let values = prompt_variables(id, text, today);
            let vars: HashMap<&str, &str> =
                values.iter().map(|(k, v)| (*k, v.as_str())).collect();
            println!();
            println!("{}", prompt.render(&vars));
        }
        None => {
            for (header, section) in [
                ("System", prompt.system_section()),
                ("User", prompt.user_section()),
            ] {
                println!();
                println!("--- {} ---", header);
                println!("{}", section.unwrap_or("(section missing)"));
            }
        }
    }

    Ok(())
}

/// Where overrides are read from (`<id>.md`)
pub fn cmd_prompts_path() -> Result<()> {
    let Some(dir) = default_prompts_dir() else {
        eprintln!("No local data directory on this system; only built-in prompts are used.");
        return Ok(());
    };
    println!("{}", dir.display());
    if !dir.exists() {
        eprintln!("(not created yet; copy a built-in prompt there as <id>.md to override it)");
    }
    Ok(())
}

fn print_problems(prompt: &Prompt, id: PromptId) {
    for problem in prompt.check(id) {
        println!("   ⚠️  {}", problem);
    }
}
