//! Line-oriented expense entry form.

use anyhow::{Context, Result, bail};
use chrono::NaiveDate;
use std::io::{BufRead, Write};

/// A submitted form, before it becomes a ledger row
#[derive(Debug, Clone, PartialEq)]
pub struct ExpenseForm {
    pub date: NaiveDate,
    pub description: String,
    pub amount: f64,
    pub category: String,
}

fn read_line<R: BufRead>(input: &mut R) -> Result<Option<String>> {
    let mut s = String::new();
    let n = input.read_line(&mut s).context("read from stdin")?;
    if n == 0 {
        return Ok(None);
    }
    Ok(Some(s.trim().to_string()))
}

/// Ask until `parse` accepts the answer. A blank answer takes `default`
/// when there is one.
fn ask<R, W, T>(
    input: &mut R,
    out: &mut W,
    label: &str,
    default: Option<&str>,
    parse: impl Fn(&str) -> std::result::Result<T, String>,
) -> Result<T>
where
    R: BufRead,
    W: Write,
{
    loop {
        match default {
            Some(d) if !d.is_empty() => write!(out, "{label} [{d}]: ")?,
            _ => write!(out, "{label}: ")?,
        }
        out.flush().ok();

        let Some(answer) = read_line(input)? else {
            bail!("input closed before the form was complete");
        };
        let answer = match (answer.is_empty(), default) {
            (true, Some(d)) => d.to_string(),
            _ => answer,
        };
        match parse(&answer) {
            Ok(v) => return Ok(v),
            Err(msg) => writeln!(out, "  {msg}")?,
        }
    }
}

pub fn parse_date(s: &str) -> std::result::Result<NaiveDate, String> {
    NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d").map_err(|_| format!("expected YYYY-MM-DD, got {s:?}"))
}

pub fn parse_amount(s: &str) -> std::result::Result<f64, String> {
    let v: f64 = s
        .trim()
        .parse()
        .map_err(|_| format!("expected a number, got {s:?}"))?;
    if !v.is_finite() || v < 0.0 {
        return Err("amount must be zero or more".to_string());
    }
    Ok(v)
}

fn non_empty(s: &str) -> std::result::Result<String, String> {
    if s.trim().is_empty() {
        Err("a description is required".to_string())
    } else {
        Ok(s.trim().to_string())
    }
}

/// Run the form: date, description, amount, then the category offered as
/// an editable default. The default is `category` when given, otherwise
/// the prediction for the description.
pub fn run_form<R, W>(
    input: &mut R,
    out: &mut W,
    date: NaiveDate,
    category: Option<&str>,
    predict: impl Fn(&str) -> String,
) -> Result<ExpenseForm>
where
    R: BufRead,
    W: Write,
{
    let date_default = date.format("%Y-%m-%d").to_string();
    let date = ask(input, out, "Date", Some(&date_default), parse_date)?;
    let description = ask(input, out, "Description", None, non_empty)?;
    let amount = ask(input, out, "Amount", Some("0.00"), parse_amount)?;

    let (label, suggested) = match category.map(str::trim).filter(|c| !c.is_empty()) {
        Some(c) => ("Category", c.to_string()),
        None => ("Category (auto-predicted, but you can edit)", predict(&description)),
    };
    let category = ask(input, out, label, Some(&suggested), |s| {
        Ok::<_, String>(s.trim().to_string())
    })?;

    Ok(ExpenseForm {
        date,
        description,
        amount,
        category,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 8, 22).unwrap()
    }

    fn fill(answers: &str) -> (Result<ExpenseForm>, String) {
        fill_with(answers, None)
    }

    fn fill_with(answers: &str, category: Option<&str>) -> (Result<ExpenseForm>, String) {
        let mut input = Cursor::new(answers.as_bytes().to_vec());
        let mut out = Vec::new();
        let res = run_form(&mut input, &mut out, today(), category, |d| {
            if d.to_lowercase().contains("shawarma") { "Food".into() } else { "Others".into() }
        });
        (res, String::from_utf8(out).unwrap())
    }

    #[test]
    fn test_defaults_accepted() {
        let (form, out) = fill("\nShawarma\n2500\n\n");
        let form = form.unwrap();
        assert_eq!(form.date, today());
        assert_eq!(form.description, "Shawarma");
        assert_eq!(form.amount, 2500.0);
        assert_eq!(form.category, "Food");
        assert!(out.contains("Date [2025-08-22]"));
        assert!(out.contains("[Food]"));
    }

    #[test]
    fn test_category_can_be_overridden() {
        let (form, _) = fill("2025-08-23\nShawarma\n12.5\nTreats\n");
        let form = form.unwrap();
        assert_eq!(form.date, NaiveDate::from_ymd_opt(2025, 8, 23).unwrap());
        assert_eq!(form.category, "Treats");
    }

    #[test]
    fn test_given_category_replaces_prediction() {
        let (form, out) = fill_with("\nShawarma\n2500\n\n", Some("Treats"));
        assert_eq!(form.unwrap().category, "Treats");
        assert!(out.contains("Category [Treats]"));
        assert!(!out.contains("auto-predicted"));

        let (form, _) = fill_with("\nShawarma\n2500\n\n", Some("  "));
        assert_eq!(form.unwrap().category, "Food");
    }

    #[test]
    fn test_invalid_answers_reprompt() {
        let (form, out) = fill("22/08/2025\n\n\n  \nRent\n-5\nabc\n100\n\n");
        let form = form.unwrap();
        assert_eq!(form.description, "Rent");
        assert_eq!(form.amount, 100.0);
        assert_eq!(form.category, "Others");
        assert!(out.contains("expected YYYY-MM-DD"));
        assert!(out.contains("a description is required"));
        assert!(out.contains("amount must be zero or more"));
        assert!(out.contains("expected a number"));
    }

    #[test]
    fn test_closed_input_is_error() {
        let (form, _) = fill("2025-08-22\n");
        assert!(form.is_err());
    }

    #[test]
    fn test_parse_amount() {
        assert_eq!(parse_amount("0"), Ok(0.0));
        assert_eq!(parse_amount(" 19.99 "), Ok(19.99));
        assert!(parse_amount("-0.01").is_err());
        assert!(parse_amount("NaN").is_err());
    }
}
