use anyhow::Result;
use crate::data::X;

/// Ordered, optionally named, collection of tensors passed between stages.
#[derive(Debug, Clone, Default)]
pub struct Xs {
    names: Vec<String>,
    values: Vec<X>,
}

impl From<X> for Xs {
    fn from(x: X) -> Self {
        let mut xs = Self::default();
        xs.push(x);
        xs
    }
}

impl std::ops::Index<usize> for Xs {
    type Output = X;

    fn index(&self, index: usize) -> &Self::Output {
        &self.values[index]
    }
}

impl Xs {
    pub fn new() -> Self {
        Default::default()
    }

    pub fn push(&mut self, x: X) {
        self.names.push(self.values.len().to_string());
        self.values.push(x);
    }

    pub fn push_kv(&mut self, key: &str, x: X) -> Result<()> {
        if self.names.iter().any(|n| n == key) {
            anyhow::bail!("Duplicate tensor name: {key}");
        }
        self.names.push(key.to_string());
        self.values.push(x);
        Ok(())
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, X> {
        self.values.iter()
    }
}
