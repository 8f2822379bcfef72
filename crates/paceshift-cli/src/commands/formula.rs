use clap::Subcommand;
use paceshift_core::timer::Formula;
use paceshift_core::Config;

#[derive(Subcommand)]
pub enum FormulaAction {
    /// List built-in presets and the configured formula
    List,
    /// Show one formula as JSON (a preset by name, or the configured one)
    Show {
        /// Preset name; omit for the configured formula
        name: Option<String>,
    },
}

/// Look up a built-in preset, matching the name case-insensitively on
/// either the full display name or its first word.
pub fn find_preset(name: &str) -> Option<Formula> {
    let wanted = name.to_lowercase();
    Formula::presets().into_iter().find(|f| {
        let full = f.name.to_lowercase();
        full == wanted || full.split_whitespace().next() == Some(wanted.as_str())
    })
}

pub fn run(action: FormulaAction) -> Result<(), Box<dyn std::error::Error>> {
    match action {
        FormulaAction::List => {
            let mut formulas = Formula::presets();
            if let Ok(configured) = Config::load_or_default().formula() {
                formulas.push(configured);
            }
            println!("{}", serde_json::to_string_pretty(&formulas)?);
        }
        FormulaAction::Show { name } => {
            let formula = match name {
                Some(name) => {
                    find_preset(&name).ok_or_else(|| format!("unknown preset: {name}"))?
                }
                None => Config::load_or_default().formula()?,
            };
            println!("{}", serde_json::to_string_pretty(&formula)?);
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn find_preset_matches_full_name_and_first_word() {
        assert_eq!(find_preset("classic walk").unwrap(), Formula::classic());
        assert_eq!(find_preset("Classic").unwrap(), Formula::classic());
        assert_eq!(find_preset("circuit").unwrap(), Formula::circuit());
        assert!(find_preset("sprint").is_none());
    }
}
