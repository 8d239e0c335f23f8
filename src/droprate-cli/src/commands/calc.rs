//! Drop-chance calculator command handlers

use crate::cli::CalcCommand;
use anyhow::{Context, Result};
use droprate::calc::{
    combine_independent_rates, drop_chance_after_kills, expected_kills_for_confidence,
    to_percent_display, RateDisplay, MAX_CONFIDENCE,
};
use droprate::parse_rate;

/// Handle the calc command
pub fn handle(command: CalcCommand) -> Result<()> {
    match command {
        CalcCommand::Chance { rate, kills } => chance(&rate, kills),
        CalcCommand::Kills { rate, confidence } => kills(&rate, confidence),
        CalcCommand::Combine { rates } => combine(&rates),
        CalcCommand::Show { rate } => show(&rate),
    }
}

fn rate_arg(text: &str) -> Result<f64> {
    let p = parse_rate(text).with_context(|| format!("Invalid drop rate '{}'", text))?;
    if p > 1.0 {
        tracing::warn!("Rate {} is above 1, using 1", text);
        return Ok(1.0);
    }
    Ok(p)
}

fn chance(rate: &str, kills: u64) -> Result<()> {
    let p = rate_arg(rate)?;
    let chance = drop_chance_after_kills(p, kills);

    println!(
        "Chance of at least one drop in {} kills: {}",
        kills,
        to_percent_display(chance)
    );
    Ok(())
}

fn kills(rate: &str, confidence: f64) -> Result<()> {
    let p = rate_arg(rate)?;
    if !(0.0..=1.0).contains(&confidence) {
        anyhow::bail!("Confidence must be between 0 and 1, got {}", confidence);
    }
    if confidence >= 1.0 {
        println!(
            "No finite kill count is certain, using {:.1}%",
            MAX_CONFIDENCE * 100.0
        );
    }

    let needed = expected_kills_for_confidence(p, confidence);
    println!(
        "Kills for {:.1}% confidence: {}",
        confidence.min(MAX_CONFIDENCE) * 100.0,
        needed
    );
    Ok(())
}

fn combine(rates: &[String]) -> Result<()> {
    let parsed = rates
        .iter()
        .map(|r| rate_arg(r))
        .collect::<Result<Vec<_>>>()?;
    let combined = combine_independent_rates(parsed.iter().copied());

    println!(
        "Chance of at least one of {} drops: {}",
        parsed.len(),
        to_percent_display(combined)
    );
    Ok(())
}

fn show(rate: &str) -> Result<()> {
    let display = RateDisplay::new(rate_arg(rate)?);

    println!("Percent:    {}", display.percent);
    println!("Fraction:   {}", display.fraction);
    println!("Odds:       {}", display.inverse);
    println!("Expected:   {} kills", display.expected);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rate_arg() {
        assert_eq!(rate_arg("1/4").unwrap(), 0.25);
        assert_eq!(rate_arg("3/2").unwrap(), 1.0);
        assert!(rate_arg("abc").is_err());
        assert!(rate_arg("1/0").is_err());
    }

    #[test]
    fn test_kills_rejects_bad_confidence() {
        assert!(kills("1/100", 1.5).is_err());
        assert!(kills("1/100", -0.1).is_err());
        assert!(kills("1/100", 0.95).is_ok());
        assert!(kills("1/100", 1.0).is_ok());
    }

    #[test]
    fn test_handle() {
        assert!(handle(CalcCommand::Chance {
            rate: "0.001".into(),
            kills: 1000
        })
        .is_ok());
        assert!(handle(CalcCommand::Combine {
            rates: vec!["1/2".into(), "nope".into()]
        })
        .is_err());
        assert!(handle(CalcCommand::Show {
            rate: "1/1000".into()
        })
        .is_ok());
    }
}
