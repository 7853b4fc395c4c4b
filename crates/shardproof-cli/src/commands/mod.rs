pub mod commit;
pub mod identity;
pub mod keygen;
pub mod replay;
pub mod verify;
pub mod verify_commit;

use std::path::Path;

/// Read a file argument, or stdin when it is `-`.
pub(crate) fn read_input(path: &Path) -> anyhow::Result<Vec<u8>> {
    use std::io::Read;

    if path.as_os_str() == "-" {
        let mut buf = Vec::new();
        std::io::stdin().read_to_end(&mut buf)?;
        Ok(buf)
    } else {
        std::fs::read(path).map_err(|e| anyhow::anyhow!("reading {}: {}", path.display(), e))
    }
}

/// Parse a comma-separated list of loss values.
pub(crate) fn parse_losses(text: &str) -> anyhow::Result<Vec<f64>> {
    if text.trim().is_empty() {
        return Ok(Vec::new());
    }
    text.split(',')
        .map(|v| {
            v.trim()
                .parse::<f64>()
                .map_err(|e| anyhow::anyhow!("invalid loss value {:?}: {}", v, e))
        })
        .collect()
}
