//! Breakdown command: who owes what.
//!
//! This module implements `tab breakdown`, the settlement view, in
//! human-readable and JSON form.

use std::io::Write;
use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use clap::Args;
use serde::Serialize;

use tab_core::{BillBreakdown, DistributionType, ReceiptId, calculate_bill_breakdown};

use super::util::{format_currency, item_label};
use crate::Config;
use crate::snapshot::Snapshot;

#[derive(Debug, Args)]
pub struct BreakdownArgs {
    /// Receipt snapshot file.
    pub snapshot: PathBuf,

    /// How to share tax (proportional or equal).
    #[arg(long)]
    pub tax: Option<DistributionType>,

    /// How to share tip (proportional or equal).
    #[arg(long)]
    pub tip: Option<DistributionType>,

    /// Output as JSON.
    #[arg(long)]
    pub json: bool,
}

/// Breakdown with provenance for JSON output.
#[derive(Debug, Serialize)]
struct BreakdownReport<'a> {
    generated_at: DateTime<Utc>,
    receipt_id: &'a ReceiptId,
    restaurant_name: Option<&'a str>,
    #[serde(flatten)]
    breakdown: &'a BillBreakdown,
}

pub fn run<W: Write>(writer: &mut W, args: &BreakdownArgs, config: &Config) -> Result<()> {
    let snapshot = Snapshot::load(&args.snapshot)?;
    let options = config.distribution(args.tax, args.tip);
    let breakdown = calculate_bill_breakdown(&snapshot, &snapshot.receipt.id, options)
        .context("failed to load bill breakdown")?;

    if args.json {
        let report = BreakdownReport {
            generated_at: Utc::now(),
            receipt_id: &snapshot.receipt.id,
            restaurant_name: snapshot.receipt.restaurant_name.as_deref(),
            breakdown: &breakdown,
        };
        serde_json::to_writer_pretty(&mut *writer, &report)?;
        writeln!(writer)?;
    } else {
        write_breakdown(
            writer,
            &breakdown,
            snapshot.receipt.restaurant_name.as_deref(),
            &config.currency_symbol,
        )?;
    }
    Ok(())
}

/// Writes the settlement view for humans.
pub fn write_breakdown<W: Write>(
    writer: &mut W,
    breakdown: &BillBreakdown,
    title: Option<&str>,
    currency: &str,
) -> Result<()> {
    let money = |amount: f64| format_currency(amount, currency);

    if let Some(title) = title {
        writeln!(writer, "{title}")?;
        writeln!(writer)?;
    }

    writeln!(writer, "{:<10}{:>10}", "Subtotal", money(breakdown.subtotal))?;
    if breakdown.tax > 0.0 {
        writeln!(
            writer,
            "{:<10}{:>10}  ({})",
            "Tax",
            money(breakdown.tax),
            breakdown.tax_distribution
        )?;
    }
    if breakdown.tip > 0.0 {
        writeln!(
            writer,
            "{:<10}{:>10}  ({})",
            "Tip",
            money(breakdown.tip),
            breakdown.tip_distribution
        )?;
    }
    writeln!(writer, "{:<10}{:>10}", "Total", money(breakdown.total))?;

    if breakdown.unclaimed_total > 0.0 {
        writeln!(writer)?;
        writeln!(
            writer,
            "{} in unclaimed items, split between everyone who claimed",
            money(breakdown.unclaimed_total)
        )?;
    }

    writeln!(writer)?;
    if breakdown.participants.is_empty() {
        writeln!(writer, "Nobody has claimed anything yet.")?;
        return Ok(());
    }

    for participant in &breakdown.participants {
        writeln!(
            writer,
            "{:<20}{:>10}",
            participant.name(),
            money(participant.total_owed)
        )?;
        writeln!(writer, "  {:<8}{:>10}", "Items", money(participant.items_total))?;
        writeln!(writer, "  {:<8}{:>10}", "Tax", money(participant.tax_portion))?;
        writeln!(writer, "  {:<8}{:>10}", "Tip", money(participant.tip_portion))?;
        for item in &participant.claimed_items {
            writeln!(
                writer,
                "    - {}: {}",
                item_label(&item.name, item.quantity),
                money(item.amount)
            )?;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    use insta::assert_snapshot;
    use tab_core::DistributionOptions;

    use crate::snapshot::tests::sample_snapshot;

    fn render(options: DistributionOptions) -> String {
        let snapshot = sample_snapshot();
        let breakdown = calculate_bill_breakdown(&snapshot, &snapshot.receipt.id, options).unwrap();
        let mut output = Vec::new();
        write_breakdown(&mut output, &breakdown, Some("Trattoria"), "£").unwrap();
        String::from_utf8(output).unwrap()
    }

    #[test]
    fn proportional_breakdown_output() {
        assert_snapshot!(render(DistributionOptions::default()), @r"
        Trattoria

        Subtotal      £60.00
        Tax           £10.00  (proportional)
        Tip            £5.00  (proportional)
        Total         £75.00

        £10.00 in unclaimed items, split between everyone who claimed

        Alice                   £42.50
          Items       £35.00
          Tax          £5.00
          Tip          £2.50
            - Steak: £30.00
        bob                     £30.00
          Items       £25.00
          Tax          £3.33
          Tip          £1.67
            - Pasta: £20.00
        ");
    }

    #[test]
    fn equal_breakdown_amounts() {
        let snapshot = sample_snapshot();
        let options = DistributionOptions::new(DistributionType::Equal, DistributionType::Equal);
        let breakdown = calculate_bill_breakdown(&snapshot, &snapshot.receipt.id, options).unwrap();

        for participant in &breakdown.participants {
            assert!((participant.tax_portion - 5.0).abs() < 1e-9);
            assert!((participant.tip_portion - 2.5).abs() < 1e-9);
        }
    }

    #[test]
    fn run_writes_json() {
        let temp = tempfile::tempdir().unwrap();
        let path = temp.path().join("receipt.json");
        sample_snapshot().save(&path).unwrap();

        let args = BreakdownArgs {
            snapshot: path,
            tax: Some(DistributionType::Equal),
            tip: None,
            json: true,
        };
        let mut output = Vec::new();
        run(&mut output, &args, &Config::default()).unwrap();

        let json: serde_json::Value = serde_json::from_slice(&output).unwrap();
        assert_eq!(json["receipt_id"], "rcpt-1");
        assert_eq!(json["tax_distribution"], "equal");
        assert_eq!(json["tip_distribution"], "proportional");
        assert_eq!(json["participants"][0]["user_id"], "alice");
        assert_eq!(json["participants"][1]["username"], "bob");
        assert!(json["generated_at"].is_string());
    }

    #[test]
    fn empty_claims_message() {
        let mut snapshot = sample_snapshot();
        snapshot.claims.clear();
        let breakdown = calculate_bill_breakdown(
            &snapshot,
            &snapshot.receipt.id,
            DistributionOptions::default(),
        )
        .unwrap();

        let mut output = Vec::new();
        write_breakdown(&mut output, &breakdown, None, "$").unwrap();
        let output = String::from_utf8(output).unwrap();

        assert!(output.starts_with("Subtotal      $60.00\n"));
        assert!(output.contains("$60.00 in unclaimed items"));
        assert!(output.ends_with("Nobody has claimed anything yet.\n"));
    }
}
