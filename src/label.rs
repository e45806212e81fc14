use eyre::Result;
use std::{fmt, time::SystemTime};

/// DMCFE label. Binds one encryption round of the decentralized scheme.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Label(Vec<u8>);

impl Label {
    /// Get the timestamp as a label. Round to minutes.
    pub fn new() -> Result<Self> {
        Ok(Self(
            (SystemTime::now()
                .duration_since(SystemTime::UNIX_EPOCH)?
                .as_secs()
                / 60)
                .to_be_bytes()
                .to_vec(),
        ))
    }

    pub fn from_bytes(b: &[u8]) -> Self {
        Self(b.to_vec())
    }

    /// Domain-separated message used to hash this label to the `k`-th
    /// coordinate of `u_l`.
    pub(crate) fn coordinate(&self, k: usize) -> Vec<u8> {
        let mut m = format!("{} ", k).into_bytes();
        m.extend_from_slice(&self.0);
        m
    }
}

impl From<&str> for Label {
    fn from(s: &str) -> Self {
        Self(s.as_bytes().to_vec())
    }
}

impl AsRef<[u8]> for Label {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", String::from_utf8_lossy(&self.0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_label() -> Result<()> {
        let l = Label::from("round-1");
        eyre::ensure!(l == Label::from_bytes(b"round-1"), "wrong label bytes");
        eyre::ensure!(l.coordinate(0) != l.coordinate(1), "coordinates collide");
        eyre::ensure!(Label::new()?.as_ref().len() == 8, "wrong timestamp size");
        Ok(())
    }
}
