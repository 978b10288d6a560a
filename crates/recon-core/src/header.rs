use std::collections::HashMap;

use recon_model::CellValue;

/// Header name -> column position for one header row.
///
/// When a name repeats, the first occurrence wins.
#[derive(Debug, Clone, Default)]
pub struct HeaderIndex {
    positions: HashMap<String, usize>,
}

impl HeaderIndex {
    pub fn from_row(row: &[CellValue]) -> Self {
        let mut positions = HashMap::with_capacity(row.len());
        for (index, cell) in row.iter().enumerate() {
            let name = cell.to_string().trim().to_string();
            if !name.is_empty() {
                positions.entry(name).or_insert(index);
            }
        }
        Self { positions }
    }

    pub fn get(&self, name: &str) -> Option<usize> {
        self.positions.get(name).copied()
    }

    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }
}
