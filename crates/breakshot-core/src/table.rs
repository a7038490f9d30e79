use std::fmt;

use serde::{Deserialize, Serialize};

use crate::config::PhysicsConfig;
use crate::error::GeometryError;
use crate::vector::Vec2;

/// Index of a pocket in [`Table::pockets`].
pub type PocketId = usize;

/// One straight piece of a cushion: segment `index` runs from vertex `index`
/// to vertex `index + 1` of cushion `cushion`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SegmentId {
    pub cushion: usize,
    pub index: usize,
}

impl fmt::Display for SegmentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "cushion {} segment {}", self.cushion, self.index)
    }
}

/// A cushion vertex a ball can clip.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CornerId {
    pub cushion: usize,
    pub vertex: usize,
}

impl fmt::Display for CornerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "cushion {} vertex {}", self.cushion, self.vertex)
    }
}

/// A rail, as an open polyline. Close a loop by repeating the first vertex.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Cushion {
    pub vertices: Vec<Vec2>,
}

/// A pocket that swallows any ball whose center enters its capture radius.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Pocket {
    pub center: Vec2,
    pub radius: f64,
}

/// Static table geometry. Read-only while a tick is being simulated.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Table {
    pub name: String,
    pub width: f64,
    pub height: f64,
    pub cushions: Vec<Cushion>,
    #[serde(default)]
    pub pockets: Vec<Pocket>,
}

impl Table {
    /// Reject layouts the contact queries would divide by zero on.
    pub fn validate(&self) -> Result<(), GeometryError> {
        for (c, cushion) in self.cushions.iter().enumerate() {
            if cushion.vertices.len() < 2 {
                return Err(GeometryError::ShortCushion {
                    cushion: c,
                    count: cushion.vertices.len(),
                });
            }
            for (i, pair) in cushion.vertices.windows(2).enumerate() {
                let len = pair[0].distance(pair[1]);
                if len.is_nan() || len <= 1e-9 {
                    return Err(GeometryError::DegenerateSegment {
                        cushion: c,
                        segment: i,
                    });
                }
            }
        }
        for (p, pocket) in self.pockets.iter().enumerate() {
            if pocket.radius.is_nan() || pocket.radius <= 0.0 {
                return Err(GeometryError::BadPocketRadius {
                    pocket: p,
                    radius: pocket.radius,
                });
            }
        }
        Ok(())
    }

    /// Every wall segment with its endpoints.
    pub fn segments(&self) -> impl Iterator<Item = (SegmentId, Vec2, Vec2)> + '_ {
        self.cushions.iter().enumerate().flat_map(|(c, cushion)| {
            cushion
                .vertices
                .windows(2)
                .enumerate()
                .map(move |(i, pair)| (SegmentId { cushion: c, index: i }, pair[0], pair[1]))
        })
    }

    pub fn segment(&self, id: SegmentId) -> Option<(Vec2, Vec2)> {
        let vertices = &self.cushions.get(id.cushion)?.vertices;
        Some((*vertices.get(id.index)?, *vertices.get(id.index + 1)?))
    }

    /// Every cushion vertex.
    pub fn corners(&self) -> impl Iterator<Item = (CornerId, Vec2)> + '_ {
        self.cushions.iter().enumerate().flat_map(|(c, cushion)| {
            cushion
                .vertices
                .iter()
                .enumerate()
                .map(move |(v, &p)| (CornerId { cushion: c, vertex: v }, p))
        })
    }

    /// Whether `point` lies on the playing surface rectangle.
    pub fn contains(&self, point: Vec2) -> bool {
        (0.0..=self.width).contains(&point.x) && (0.0..=self.height).contains(&point.y)
    }
}

/// Build a six-pocket table from the config dimensions.
///
/// The playing surface spans `[0, width] x [0, height]`. Each of the six rails
/// is a four-vertex cushion: an angled jaw, the straight rail, and another jaw,
/// with the jaws bending away from the surface toward the neighbouring pockets.
pub fn standard_table(config: &PhysicsConfig) -> Table {
    let w = config.table_width;
    let h = config.table_height;
    let cm = config.corner_mouth;
    let sm = config.side_mouth;

    let rails = [
        // Bottom, left of the side pocket
        (Vec2::new(cm, 0.0), Vec2::new(w / 2.0 - sm, 0.0)),
        // Bottom, right of the side pocket
        (Vec2::new(w / 2.0 + sm, 0.0), Vec2::new(w - cm, 0.0)),
        // Right
        (Vec2::new(w, cm), Vec2::new(w, h - cm)),
        // Top, right of the side pocket
        (Vec2::new(w - cm, h), Vec2::new(w / 2.0 + sm, h)),
        // Top, left of the side pocket
        (Vec2::new(w / 2.0 - sm, h), Vec2::new(cm, h)),
        // Left
        (Vec2::new(0.0, h - cm), Vec2::new(0.0, cm)),
    ];

    let cushions = rails
        .iter()
        .map(|&(a, b)| {
            // Rails run counter-clockwise, so the surface is to the left.
            let along = (b - a) * (1.0 / a.distance(b));
            let outward = -along.perp();
            let run = config.ball_radius * 1.5;
            let depth = config.ball_radius * 2.0;
            Cushion {
                vertices: vec![
                    a - along * run + outward * depth,
                    a,
                    b,
                    b + along * run + outward * depth,
                ],
            }
        })
        .collect();

    let corner_r = config.corner_pocket_radius;
    let side_r = config.side_pocket_radius;
    let corner_off = corner_r * 0.25;
    let side_off = side_r * 0.4;
    let pockets = vec![
        Pocket {
            center: Vec2::new(-corner_off, -corner_off),
            radius: corner_r,
        },
        Pocket {
            center: Vec2::new(w / 2.0, -side_off),
            radius: side_r,
        },
        Pocket {
            center: Vec2::new(w + corner_off, -corner_off),
            radius: corner_r,
        },
        Pocket {
            center: Vec2::new(w + corner_off, h + corner_off),
            radius: corner_r,
        },
        Pocket {
            center: Vec2::new(w / 2.0, h + side_off),
            radius: side_r,
        },
        Pocket {
            center: Vec2::new(-corner_off, h + corner_off),
            radius: corner_r,
        },
    ];

    Table {
        name: "Standard Six-Pocket".to_string(),
        width: w,
        height: h,
        cushions,
        pockets,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn standard_table_is_valid() {
        let table = standard_table(&PhysicsConfig::default());
        assert_eq!(table.validate(), Ok(()));
        assert_eq!(table.cushions.len(), 6);
        assert_eq!(table.pockets.len(), 6);
        assert_eq!(table.segments().count(), 18);
        assert_eq!(table.corners().count(), 24);
    }

    #[test]
    fn jaws_bend_away_from_surface() {
        let config = PhysicsConfig::default();
        let table = standard_table(&config);
        for cushion in &table.cushions {
            let (first, last) = (cushion.vertices[0], cushion.vertices[3]);
            assert!(
                !table.contains(first) && !table.contains(last),
                "Jaw tips {first:?} / {last:?} should be off the playing surface"
            );
            assert!(table.contains(cushion.vertices[1]));
            assert!(table.contains(cushion.vertices[2]));
        }
    }

    #[test]
    fn segment_lookup_matches_iteration() {
        let table = standard_table(&PhysicsConfig::default());
        for (id, a, b) in table.segments() {
            assert_eq!(table.segment(id), Some((a, b)));
        }
        assert_eq!(
            table.segment(SegmentId {
                cushion: 0,
                index: 3
            }),
            None
        );
    }

    #[test]
    fn repeated_vertex_is_degenerate() {
        let table = Table {
            name: "bad".to_string(),
            width: 10.0,
            height: 10.0,
            cushions: vec![Cushion {
                vertices: vec![Vec2::new(0.0, 0.0), Vec2::new(5.0, 0.0), Vec2::new(5.0, 0.0)],
            }],
            pockets: Vec::new(),
        };
        assert_eq!(
            table.validate(),
            Err(GeometryError::DegenerateSegment {
                cushion: 0,
                segment: 1
            })
        );
    }

    #[test]
    fn single_vertex_cushion_is_rejected() {
        let table = Table {
            name: "bad".to_string(),
            width: 10.0,
            height: 10.0,
            cushions: vec![Cushion {
                vertices: vec![Vec2::new(1.0, 1.0)],
            }],
            pockets: Vec::new(),
        };
        assert_eq!(
            table.validate(),
            Err(GeometryError::ShortCushion {
                cushion: 0,
                count: 1
            })
        );
    }

    #[test]
    fn table_roundtrips_through_toml() {
        let table = standard_table(&PhysicsConfig::default());
        let text = toml::to_string(&table).expect("serialize");
        let back: Table = toml::from_str(&text).expect("deserialize");
        assert_eq!(back, table);
    }
}
