//! Edge-pair registry.
//!
//! Owns one [`FingerPlan`] per mating pair of edges. Registering a pair hands
//! out one [`JointRef`] per side; side A starts with a tab and side B is its
//! complement, so a panel edge cannot pick its own invert flag.

use boxjoint_core::{JointError, JointResult};
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::debug;

use crate::joint::JointDepths;
use crate::panel::PanelSpec;
use crate::params::{EdgeFamily, JointParams};
use crate::planner::{plan, FingerPlan};

/// Length agreement required between the two edges of a pair, in mm.
pub const LENGTH_TOLERANCE: f64 = 1e-9;

/// Handle to a pair inside one registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PairId(usize);

impl PairId {
    pub fn index(&self) -> usize {
        self.0
    }
}

impl fmt::Display for PairId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Names one edge of one panel.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EdgeKey {
    pub panel: String,
    pub edge: String,
}

impl EdgeKey {
    pub fn new(panel: impl Into<String>, edge: impl Into<String>) -> Self {
        Self {
            panel: panel.into(),
            edge: edge.into(),
        }
    }
}

impl fmt::Display for EdgeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.panel, self.edge)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MateSide {
    A,
    B,
}

impl MateSide {
    fn slot(&self) -> usize {
        match self {
            MateSide::A => 0,
            MateSide::B => 1,
        }
    }
}

/// Binds a panel edge to one side of a registered pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct JointRef {
    pub pair: PairId,
    pub side: MateSide,
}

impl JointRef {
    /// Side B renders with tabs and slots swapped.
    pub fn inverted(&self) -> bool {
        self.side == MateSide::B
    }
}

/// The two handles produced by registering a pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Mate {
    pub a: JointRef,
    pub b: JointRef,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EdgePair {
    pub id: PairId,
    pub family: EdgeFamily,
    pub a: EdgeKey,
    pub b: EdgeKey,
    pub plan: FingerPlan,
}

impl EdgePair {
    pub fn length(&self) -> f64 {
        self.plan.length
    }

    pub fn key(&self, side: MateSide) -> &EdgeKey {
        match side {
            MateSide::A => &self.a,
            MateSide::B => &self.b,
        }
    }
}

impl fmt::Display for EdgePair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({} <-> {})", self.id, self.a, self.b)
    }
}

/// Arena of edge pairs built once per generation request.
#[derive(Debug, Clone)]
pub struct EdgePairRegistry {
    params: JointParams,
    depths: JointDepths,
    pairs: Vec<EdgePair>,
}

impl EdgePairRegistry {
    pub fn new(params: JointParams) -> Self {
        let depths = params.depths();
        Self {
            params,
            depths,
            pairs: Vec::new(),
        }
    }

    pub fn params(&self) -> &JointParams {
        &self.params
    }

    pub fn depths(&self) -> JointDepths {
        self.depths
    }

    pub fn pairs(&self) -> &[EdgePair] {
        &self.pairs
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    /// Registers a mating pair and plans its fingers.
    ///
    /// Both lengths must agree within [`LENGTH_TOLERANCE`].
    pub fn register(
        &mut self,
        family: EdgeFamily,
        a: EdgeKey,
        a_len: f64,
        b: EdgeKey,
        b_len: f64,
    ) -> JointResult<Mate> {
        if (a_len - b_len).abs() > LENGTH_TOLERANCE || !a_len.is_finite() {
            return Err(JointError::TopologyMismatch(format!(
                "{a} has length {a_len} but its mate {b} has length {b_len}"
            )));
        }

        let plan = plan(
            a_len,
            self.params.finger_width_for(family),
            self.params.min_fingers,
            self.params.explicit_count_for(family),
        )?;

        let id = PairId(self.pairs.len());
        debug!(
            "Registered {} pair {}: {} <-> {}, {:.3} mm, {} fingers",
            family, id, a, b, a_len, plan.count
        );
        self.pairs.push(EdgePair {
            id,
            family,
            a,
            b,
            plan,
        });

        Ok(Mate {
            a: JointRef {
                pair: id,
                side: MateSide::A,
            },
            b: JointRef {
                pair: id,
                side: MateSide::B,
            },
        })
    }

    pub fn get(&self, id: PairId) -> JointResult<&EdgePair> {
        self.pairs
            .get(id.0)
            .ok_or_else(|| JointError::UnboundPair(format!("pair {id} is not registered")))
    }

    /// Checks that every pair side is bound by exactly one panel edge whose
    /// key and length match the registration.
    pub fn verify_bindings(&self, specs: &[PanelSpec]) -> JointResult<()> {
        let mut bound: Vec<[Option<&str>; 2]> = vec![[None, None]; self.pairs.len()];

        for spec in specs {
            for edge in &spec.edges {
                let Some(joint) = edge.joint else {
                    continue;
                };
                let pair = self.get(joint.pair).map_err(|_| {
                    JointError::UnboundPair(format!(
                        "{}.{} references unknown pair {}",
                        spec.name, edge.name, joint.pair
                    ))
                })?;

                let expected = pair.key(joint.side);
                if expected.panel != spec.name || expected.edge != edge.name {
                    return Err(JointError::TopologyMismatch(format!(
                        "pair {} side {:?} is registered to {} but bound by {}.{}",
                        pair.id, joint.side, expected, spec.name, edge.name
                    )));
                }

                if (edge.length - pair.length()).abs() > LENGTH_TOLERANCE {
                    return Err(JointError::TopologyMismatch(format!(
                        "{}.{} has length {} but pair {} has length {}",
                        spec.name,
                        edge.name,
                        edge.length,
                        pair.id,
                        pair.length()
                    )));
                }

                let slot = &mut bound[pair.id.0][joint.side.slot()];
                if let Some(previous) = slot {
                    return Err(JointError::TopologyMismatch(format!(
                        "pair {} side {:?} is bound twice ({} and {})",
                        pair.id, joint.side, previous, spec.name
                    )));
                }
                *slot = Some(spec.name.as_str());
            }
        }

        for (pair, sides) in self.pairs.iter().zip(&bound) {
            for side in [MateSide::A, MateSide::B] {
                if sides[side.slot()].is_none() {
                    return Err(JointError::UnboundPair(format!(
                        "pair {} side {:?} ({}) is not bound to any panel edge",
                        pair.id,
                        side,
                        pair.key(side)
                    )));
                }
            }
        }

        debug!("Verified bindings for {} pairs", self.pairs.len());
        Ok(())
    }
}
