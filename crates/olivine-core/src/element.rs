use serde::{Deserialize, Serialize};
use std::fmt;

pub const ELEMENT_LIST: [&str; 118] = [
    "H", "He", "Li", "Be", "B", "C", "N", "O", "F", "Ne", "Na", "Mg", "Al", "Si", "P", "S", "Cl",
    "Ar", "K", "Ca", "Sc", "Ti", "V", "Cr", "Mn", "Fe", "Co", "Ni", "Cu", "Zn", "Ga", "Ge", "As",
    "Se", "Br", "Kr", "Rb", "Sr", "Y", "Zr", "Nb", "Mo", "Tc", "Ru", "Rh", "Pd", "Ag", "Cd", "In",
    "Sn", "Sb", "Te", "I", "Xe", "Cs", "Ba", "La", "Ce", "Pr", "Nd", "Pm", "Sm", "Eu", "Gd", "Tb",
    "Dy", "Ho", "Er", "Tm", "Yb", "Lu", "Hf", "Ta", "W", "Re", "Os", "Ir", "Pt", "Au", "Hg", "Tl",
    "Pb", "Bi", "Po", "At", "Rn", "Fr", "Ra", "Ac", "Th", "Pa", "U", "Np", "Pu", "Am", "Cm", "Bk",
    "Cf", "Es", "Fm", "Md", "No", "Lr", "Rf", "Db", "Sg", "Bh", "Hs", "Mt", "Ds", "Rg", "Cn", "Nh",
    "Fl", "Mc", "Lv", "Ts", "Og",
];

/// A chemical element, stored by symbol.
///
/// The symbol is kept as written; [`Element::atomic_number`] returns `None`
/// for symbols not in the periodic table (e.g. after deserializing a
/// hand-edited structure file).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Element(String);

impl Element {
    /// Create an element from its symbol. Returns `None` for unknown symbols.
    pub fn new(symbol: &str) -> Option<Self> {
        ELEMENT_LIST
            .contains(&symbol)
            .then(|| Element(symbol.to_string()))
    }
    pub fn symbol(&self) -> &str {
        &self.0
    }
    /// 1-based atomic number (H = 1).
    pub fn atomic_number(&self) -> Option<usize> {
        ELEMENT_LIST.iter().position(|&s| s == self.0).map(|i| i + 1)
    }
    pub fn from_atomic_number(z: usize) -> Option<Self> {
        ELEMENT_LIST.get(z.wrapping_sub(1)).map(|s| Element(s.to_string()))
    }
}

impl fmt::Display for Element {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_element_lookup() {
        let fe = Element::new("Fe").unwrap();
        assert_eq!(fe.symbol(), "Fe");
        assert_eq!(fe.atomic_number(), Some(26));
        assert_eq!(Element::from_atomic_number(26), Some(fe));
        assert!(Element::new("Xx").is_none());
    }

    #[test]
    fn test_element_table_endpoints() {
        assert_eq!(Element::new("H").unwrap().atomic_number(), Some(1));
        assert_eq!(Element::new("Og").unwrap().atomic_number(), Some(118));
    }
}
