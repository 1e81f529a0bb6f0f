//! Activate command: opens a draft receipt for claiming.

use std::io::Write;
use std::path::PathBuf;

use anyhow::{Result, bail};
use clap::Args;

use tab_core::ReceiptStatus;

use crate::snapshot::Snapshot;

#[derive(Debug, Args)]
pub struct ActivateArgs {
    /// Receipt snapshot file.
    pub snapshot: PathBuf,
}

pub fn run<W: Write>(writer: &mut W, args: &ActivateArgs) -> Result<()> {
    let mut snapshot = Snapshot::load(&args.snapshot)?;
    match snapshot.receipt.status {
        ReceiptStatus::Draft => {}
        ReceiptStatus::Active => {
            writeln!(writer, "Receipt is already active")?;
            return Ok(());
        }
        ReceiptStatus::Settled => bail!("receipt is settled and cannot be reopened"),
    }

    snapshot.receipt.status = ReceiptStatus::Active;
    snapshot.save(&args.snapshot)?;
    tracing::debug!(receipt = %snapshot.receipt.id, "receipt activated");
    writeln!(writer, "Receipt is open for claims")?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::snapshot::tests::sample_snapshot;

    #[test]
    fn draft_becomes_active() {
        let temp = tempfile::tempdir().unwrap();
        let path = temp.path().join("receipt.json");
        let mut snapshot = sample_snapshot();
        snapshot.receipt.status = ReceiptStatus::Draft;
        snapshot.save(&path).unwrap();

        let args = ActivateArgs { snapshot: path };
        let mut output = Vec::new();
        run(&mut output, &args).unwrap();
        run(&mut output, &args).unwrap();

        assert_eq!(
            Snapshot::load(&args.snapshot).unwrap().receipt.status,
            ReceiptStatus::Active
        );
        assert_eq!(
            String::from_utf8(output).unwrap(),
            "Receipt is open for claims\nReceipt is already active\n"
        );
    }

    #[test]
    fn settled_cannot_reopen() {
        let temp = tempfile::tempdir().unwrap();
        let path = temp.path().join("receipt.json");
        let mut snapshot = sample_snapshot();
        snapshot.receipt.status = ReceiptStatus::Settled;
        snapshot.save(&path).unwrap();

        let err = run(&mut std::io::sink(), &ActivateArgs { snapshot: path }).unwrap_err();
        assert_eq!(err.to_string(), "receipt is settled and cannot be reopened");
    }
}
