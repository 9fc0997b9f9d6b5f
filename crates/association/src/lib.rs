//! Text-to-symbol association
//!
//! Every text label is joined to the symbol whose center is nearest to its
//! own, provided that distance is strictly below the threshold. Labels with
//! no qualifying symbol get no association. The scan is exhaustive,
//! O(|text| x |symbols|).
//!
//! # Example
//! ```
//! use drawing_association::{Associator, AssociationConfig};
//! use drawing_common::{BBox, SymbolBox, TextBox};
//!
//! let text = [TextBox::new(1, "P-101", BBox::new(0, 0, 20, 20), 0.0)];
//! let symbols = [SymbolBox::new("A", BBox::new(0, 30, 20, 20))];
//! let associator = Associator::new(AssociationConfig::default()).unwrap();
//! let (links, symbol) = associator.associate_and_resolve(&text, &symbols, Some(1u32.into()));
//! assert_eq!(links[0].distance, 30.0);
//! assert_eq!(symbol.map(|s| s.id), Some("A".to_string()));
//! ```

use drawing_common::{round2, Association, ProcessingError, Result, SymbolBox, TextBox};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use tracing::debug;

/// Which symbol wins when several are exactly equally near
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TieBreak {
    /// First in the symbol slice
    #[default]
    EncounterOrder,
    /// Smallest id, with shorter ids first (`S2` before `S10`)
    LowestSymbolId,
}

/// Configuration for association
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AssociationConfig {
    /// Exclusive upper bound on center distance, in pixels
    pub distance_threshold: f64,
    pub tie_break: TieBreak,
}

impl Default for AssociationConfig {
    fn default() -> Self {
        Self {
            distance_threshold: 50.0,
            tie_break: TieBreak::EncounterOrder,
        }
    }
}

impl AssociationConfig {
    pub fn validate(&self) -> Result<()> {
        if !self.distance_threshold.is_finite() || self.distance_threshold < 0.0 {
            return Err(ProcessingError::InvalidConfig(format!(
                "distance_threshold must be finite and non-negative, got {}",
                self.distance_threshold
            )));
        }
        Ok(())
    }
}

/// Text id to resolve: a bare id or the text record itself
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Query<'a> {
    TextId(u32),
    Text(&'a TextBox),
}

impl Query<'_> {
    #[must_use]
    pub fn text_id(&self) -> u32 {
        match self {
            Query::TextId(id) => *id,
            Query::Text(tb) => tb.id(),
        }
    }
}

impl From<u32> for Query<'_> {
    fn from(id: u32) -> Self {
        Query::TextId(id)
    }
}

impl<'a> From<&'a TextBox> for Query<'a> {
    fn from(tb: &'a TextBox) -> Self {
        Query::Text(tb)
    }
}

/// Nearest-symbol associator
#[derive(Debug, Clone, Copy)]
pub struct Associator {
    config: AssociationConfig,
}

impl Associator {
    pub fn new(config: AssociationConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    #[must_use]
    pub const fn config(&self) -> &AssociationConfig {
        &self.config
    }

    /// One association per text box that has a symbol strictly within the threshold
    #[must_use]
    pub fn associate(&self, text: &[TextBox], symbols: &[SymbolBox]) -> Vec<Association> {
        let associations: Vec<Association> = text
            .iter()
            .filter_map(|tb| {
                let (symbol, distance) = self.nearest(tb, symbols)?;
                Some(Association {
                    text_id: tb.id(),
                    text_center: tb.center(),
                    symbol_id: symbol.id.clone(),
                    symbol_bbox: symbol.bbox,
                    symbol_center: symbol.center,
                    distance: round2(distance),
                })
            })
            .collect();
        debug!(
            "Associated {} of {} text boxes with {} symbols",
            associations.len(),
            text.len(),
            symbols.len()
        );
        associations
    }

    /// Associate, then resolve `query` against the result when given
    #[must_use]
    pub fn associate_and_resolve(
        &self,
        text: &[TextBox],
        symbols: &[SymbolBox],
        query: Option<Query<'_>>,
    ) -> (Vec<Association>, Option<SymbolBox>) {
        let associations = self.associate(text, symbols);
        let symbol = query.and_then(|q| resolve(&associations, symbols, q).cloned());
        (associations, symbol)
    }

    fn nearest<'s>(&self, tb: &TextBox, symbols: &'s [SymbolBox]) -> Option<(&'s SymbolBox, f64)> {
        let center = tb.center();
        let mut best: Option<(&SymbolBox, f64)> = None;
        for symbol in symbols {
            let distance = center.distance(&symbol.center);
            if distance >= self.config.distance_threshold {
                continue;
            }
            let better = match best {
                None => true,
                Some((current, d)) => match distance.partial_cmp(&d) {
                    Some(Ordering::Less) => true,
                    Some(Ordering::Equal) => {
                        self.config.tie_break == TieBreak::LowestSymbolId
                            && id_order(&symbol.id, &current.id) == Ordering::Less
                    }
                    _ => false,
                },
            };
            if better {
                best = Some((symbol, distance));
            }
        }
        best
    }
}

/// Associate with an explicit threshold and encounter-order ties
#[must_use]
pub fn associate(
    text: &[TextBox],
    symbols: &[SymbolBox],
    distance_threshold: f64,
) -> Vec<Association> {
    Associator {
        config: AssociationConfig {
            distance_threshold,
            ..Default::default()
        },
    }
    .associate(text, symbols)
}

/// Symbol associated with the queried text id, if any
pub fn resolve<'s, 'q>(
    associations: &[Association],
    symbols: &'s [SymbolBox],
    query: impl Into<Query<'q>>,
) -> Option<&'s SymbolBox> {
    let text_id = query.into().text_id();
    let association = associations.iter().find(|a| a.text_id == text_id)?;
    symbols.iter().find(|s| s.id == association.symbol_id)
}

fn id_order(a: &str, b: &str) -> Ordering {
    a.len().cmp(&b.len()).then_with(|| a.cmp(b))
}

#[cfg(test)]
mod tests {
    use super::*;
    use drawing_common::{BBox, Point};

    /// Text box whose center is exactly `(cx, cy)`
    fn text_at(id: u32, cx: i32, cy: i32) -> TextBox {
        TextBox::new(id, format!("T{id}"), BBox::new(cx - 10, cy - 5, 20, 10), 0.0)
    }

    fn symbol_at(id: &str, cx: i32, cy: i32) -> SymbolBox {
        SymbolBox::new(id, BBox::new(cx - 10, cy - 10, 20, 20))
    }

    #[test]
    #[allow(clippy::float_cmp)]
    fn test_scenario_threshold_50_and_20() {
        let text = [text_at(1, 10, 10)];
        let symbols = [symbol_at("A", 10, 40)];

        let links = associate(&text, &symbols, 50.0);
        assert_eq!(links.len(), 1);
        assert_eq!(links[0].text_id, 1);
        assert_eq!(links[0].symbol_id, "A");
        assert_eq!(links[0].distance, 30.0);
        assert_eq!(links[0].text_center, Point::new(10.0, 10.0));
        assert_eq!(links[0].symbol_center, Point::new(10.0, 40.0));

        assert!(associate(&text, &symbols, 20.0).is_empty());
    }

    #[test]
    fn test_threshold_is_exclusive() {
        let text = [text_at(1, 0, 0)];
        let symbols = [symbol_at("A", 30, 40)];
        assert!(associate(&text, &symbols, 50.0).is_empty());
        assert_eq!(associate(&text, &symbols, 50.01).len(), 1);
    }

    #[test]
    fn test_nearest_symbol_wins() {
        let text: Vec<TextBox> = (0..6)
            .map(|i| text_at(i + 1, 25 * i as i32, 7 * i as i32))
            .collect();
        let symbols: Vec<SymbolBox> = (0..8)
            .map(|j| symbol_at(&format!("S{}", j + 1), 20 * j, (j * 13) % 40))
            .collect();

        for link in associate(&text, &symbols, 45.0) {
            let tb = text.iter().find(|t| t.id() == link.text_id).unwrap();
            let chosen = tb.center().distance(&link.symbol_center);
            assert!(chosen < 45.0);
            for s in &symbols {
                assert!(tb.center().distance(&s.center) >= chosen);
            }
        }
    }

    #[test]
    fn test_text_without_symbols_is_dropped() {
        let text = [text_at(1, 0, 0), text_at(2, 500, 500)];
        let symbols = [symbol_at("A", 5, 5)];
        let links = associate(&text, &symbols, 50.0);
        assert_eq!(links.len(), 1);
        assert_eq!(links[0].text_id, 1);
        assert!(associate(&text, &[], 50.0).is_empty());
    }

    #[test]
    fn test_tie_break_modes() {
        let text = [text_at(1, 0, 0)];
        let symbols = [symbol_at("S10", 0, 20), symbol_at("S2", 20, 0)];

        let encounter = Associator::new(AssociationConfig::default()).unwrap();
        assert_eq!(encounter.associate(&text, &symbols)[0].symbol_id, "S10");

        let lowest = Associator::new(AssociationConfig {
            tie_break: TieBreak::LowestSymbolId,
            ..Default::default()
        })
        .unwrap();
        assert_eq!(lowest.associate(&text, &symbols)[0].symbol_id, "S2");

        let reversed = [symbols[1].clone(), symbols[0].clone()];
        assert_eq!(lowest.associate(&text, &reversed)[0].symbol_id, "S2");
    }

    #[test]
    fn test_resolve_by_id_and_record() {
        let text = [text_at(1, 10, 10), text_at(2, 300, 300)];
        let symbols = [symbol_at("A", 10, 40), symbol_at("B", 400, 400)];
        let links = associate(&text, &symbols, 50.0);

        assert_eq!(resolve(&links, &symbols, 1u32).map(|s| s.id.as_str()), Some("A"));
        assert_eq!(resolve(&links, &symbols, &text[0]).map(|s| s.id.as_str()), Some("A"));
        assert!(resolve(&links, &symbols, 2u32).is_none());
        assert!(resolve(&links, &symbols, 99u32).is_none());
    }

    #[test]
    fn test_associate_and_resolve() {
        let text = [text_at(1, 10, 10)];
        let symbols = [symbol_at("A", 10, 40)];
        let associator = Associator::new(AssociationConfig::default()).unwrap();

        let (links, symbol) = associator.associate_and_resolve(&text, &symbols, None);
        assert_eq!(links.len(), 1);
        assert!(symbol.is_none());

        let query = Some(Query::from(&text[0]));
        let (_, symbol) = associator.associate_and_resolve(&text, &symbols, query);
        assert_eq!(symbol, Some(symbols[0].clone()));
    }

    #[test]
    fn test_negative_threshold_is_rejected() {
        let config = AssociationConfig {
            distance_threshold: -1.0,
            ..Default::default()
        };
        assert!(Associator::new(config).is_err());
    }
}
