use super::balance::{self, BalanceCheck, DEFAULT_BALANCE_TOLERANCE};
use super::error::EngineError;
use super::progress::{Progress, ProgressReporter};
use crate::core::components::ComponentSet;
use crate::core::ids::{StreamId, UnitId};
use crate::core::streams::{Stream, StreamError};
use crate::core::units::UnitOperation;
use slotmap::SlotMap;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tracing::{debug, info};

#[derive(Debug)]
struct UnitSlot {
    unit: Box<dyn UnitOperation>,
    ins: Vec<StreamId>,
    outs: Vec<StreamId>,
}

/// A single-pass steady-state flowsheet.
///
/// The system owns every stream and unit. Units are simulated in the order they
/// were added; because an inlet must exist before the unit consuming it is
/// added, that order is always valid.
#[derive(Debug)]
pub struct System {
    id: String,
    components: Arc<ComponentSet>,
    streams: SlotMap<StreamId, Stream>,
    stream_names: HashMap<String, StreamId>,
    units: SlotMap<UnitId, UnitSlot>,
    unit_names: HashMap<String, UnitId>,
    path: Vec<UnitId>,
    feeds: Vec<StreamId>,
    consumed: HashSet<StreamId>,
    balance_tolerance: f64,
    balances: Vec<BalanceCheck>,
}

impl System {
    pub fn new(id: &str, components: Arc<ComponentSet>) -> Self {
        Self {
            id: id.to_string(),
            components,
            streams: SlotMap::with_key(),
            stream_names: HashMap::new(),
            units: SlotMap::with_key(),
            unit_names: HashMap::new(),
            path: Vec::new(),
            feeds: Vec::new(),
            consumed: HashSet::new(),
            balance_tolerance: DEFAULT_BALANCE_TOLERANCE,
            balances: Vec::new(),
        }
    }

    pub fn with_balance_tolerance(mut self, tolerance: f64) -> Self {
        self.balance_tolerance = tolerance;
        self
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn components(&self) -> &Arc<ComponentSet> {
        &self.components
    }

    pub fn balance_tolerance(&self) -> f64 {
        self.balance_tolerance
    }

    /// Registers an external feed stream.
    pub fn add_feed(&mut self, stream: Stream) -> Result<StreamId, EngineError> {
        if !Arc::ptr_eq(stream.components(), &self.components) {
            return Err(StreamError::IncompatibleComponents {
                stream: stream.id().to_string(),
                other: self.id.clone(),
            }
            .into());
        }
        if self.stream_names.contains_key(stream.id()) {
            return Err(EngineError::DuplicateStream(stream.id().to_string()));
        }
        let name = stream.id().to_string();
        let sid = self.streams.insert(stream);
        self.stream_names.insert(name, sid);
        self.feeds.push(sid);
        Ok(sid)
    }

    /// Appends a unit to the simulation path, creating its outlet streams empty.
    ///
    /// Every inlet must be a feed or an outlet of an earlier unit and may be
    /// consumed only once; every outlet name must be new.
    pub fn add_unit(
        &mut self,
        unit: Box<dyn UnitOperation>,
        ins: &[&str],
        outs: &[&str],
    ) -> Result<UnitId, EngineError> {
        let unit_id = unit.id().to_string();
        if self.unit_names.contains_key(&unit_id) {
            return Err(EngineError::DuplicateUnit(unit_id));
        }
        for (direction, arity, found) in [
            ("inlet(s)", unit.inlets(), ins.len()),
            ("outlet(s)", unit.outlets(), outs.len()),
        ] {
            if !arity.accepts(found) {
                return Err(EngineError::PortMismatch {
                    unit: unit_id,
                    direction,
                    expected: arity.to_string(),
                    found,
                });
            }
        }

        let mut in_ids = Vec::with_capacity(ins.len());
        for name in ins {
            let sid = *self
                .stream_names
                .get(*name)
                .ok_or_else(|| EngineError::UnresolvedStream {
                    unit: unit_id.clone(),
                    stream: name.to_string(),
                })?;
            if self.consumed.contains(&sid) || in_ids.contains(&sid) {
                return Err(EngineError::StreamAlreadyConsumed {
                    stream: name.to_string(),
                    unit: unit_id,
                });
            }
            in_ids.push(sid);
        }

        let mut seen = HashSet::new();
        for name in outs {
            if self.stream_names.contains_key(*name) || !seen.insert(*name) {
                return Err(EngineError::DuplicateStream(name.to_string()));
            }
        }

        let out_ids: Vec<StreamId> = outs
            .iter()
            .map(|name| {
                let sid = self
                    .streams
                    .insert(Stream::new(name, self.components.clone()));
                self.stream_names.insert(name.to_string(), sid);
                sid
            })
            .collect();
        self.consumed.extend(in_ids.iter().copied());

        debug!(
            "Added unit '{}' ({}): {:?} -> {:?}",
            unit_id,
            unit.kind(),
            ins,
            outs
        );
        let uid = self.units.insert(UnitSlot {
            unit,
            ins: in_ids,
            outs: out_ids,
        });
        self.unit_names.insert(unit_id, uid);
        self.path.push(uid);
        Ok(uid)
    }

    /// Runs every unit once in path order and verifies its mass balance.
    pub fn simulate(&mut self, reporter: &ProgressReporter) -> Result<(), EngineError> {
        info!("Simulating system '{}' ({} units).", self.id, self.path.len());
        self.balances.clear();
        reporter.report(Progress::PhaseStart {
            name: "Simulating flowsheet",
        });
        reporter.report(Progress::TaskStart {
            total_steps: self.path.len() as u64,
        });

        for uid in self.path.clone() {
            let slot = self
                .units
                .get_mut(uid)
                .ok_or_else(|| EngineError::Internal(format!("unit {uid:?} missing from path")))?;
            reporter.report(Progress::UnitStart {
                id: slot.unit.id().to_string(),
                kind: slot.unit.kind(),
            });

            let ins = slot
                .ins
                .iter()
                .map(|sid| lookup(&self.streams, *sid))
                .collect::<Result<Vec<&Stream>, _>>()?;
            let mut outs = slot
                .outs
                .iter()
                .map(|sid| lookup(&self.streams, *sid).cloned())
                .collect::<Result<Vec<Stream>, _>>()?;

            slot.unit.run(&ins, &mut outs)?;
            let checks = balance::verify(
                slot.unit.id(),
                slot.unit.conserved(),
                &ins,
                &outs,
                self.balance_tolerance,
            )?;
            debug!(
                "Unit '{}' passed {} balance check(s).",
                slot.unit.id(),
                checks.len()
            );
            self.balances.extend(checks);

            for (sid, stream) in slot.outs.iter().zip(outs) {
                let target = self
                    .streams
                    .get_mut(*sid)
                    .ok_or_else(|| EngineError::Internal(format!("stream {sid:?} missing")))?;
                *target = stream;
            }
            reporter.report(Progress::UnitFinish);
            reporter.report(Progress::TaskIncrement);
        }

        reporter.report(Progress::TaskFinish);
        reporter.report(Progress::PhaseFinish);
        Ok(())
    }

    pub fn stream(&self, name: &str) -> Option<&Stream> {
        self.stream_names
            .get(name)
            .and_then(|sid| self.streams.get(*sid))
    }

    /// Mutable access to a stream, e.g. to change a feed before simulating again.
    pub fn stream_mut(&mut self, name: &str) -> Option<&mut Stream> {
        let sid = *self.stream_names.get(name)?;
        self.streams.get_mut(sid)
    }

    pub fn unit(&self, id: &str) -> Option<&dyn UnitOperation> {
        self.unit_names
            .get(id)
            .and_then(|uid| self.units.get(*uid))
            .map(|slot| slot.unit.as_ref())
    }

    /// Units in simulation order.
    pub fn units(&self) -> impl Iterator<Item = &dyn UnitOperation> {
        self.path
            .iter()
            .filter_map(|uid| self.units.get(*uid))
            .map(|slot| slot.unit.as_ref())
    }

    pub fn feeds(&self) -> impl Iterator<Item = &Stream> {
        self.feeds.iter().filter_map(|sid| self.streams.get(*sid))
    }

    /// Unit outlets that no other unit consumes, in creation order.
    pub fn products(&self) -> impl Iterator<Item = &Stream> {
        self.path
            .iter()
            .filter_map(|uid| self.units.get(*uid))
            .flat_map(|slot| slot.outs.iter())
            .filter(|sid| !self.consumed.contains(*sid))
            .filter_map(|sid| self.streams.get(*sid))
    }

    /// Balance records of the last simulation.
    pub fn balances(&self) -> &[BalanceCheck] {
        &self.balances
    }
}

fn lookup(streams: &SlotMap<StreamId, Stream>, sid: StreamId) -> Result<&Stream, EngineError> {
    streams
        .get(sid)
        .ok_or_else(|| EngineError::Internal(format!("stream {sid:?} missing")))
}
