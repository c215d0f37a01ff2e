//! Finite-capacity resource pools: preparation bays, operating rooms and recovery beds.
//!
//! A pool grants a unit immediately when one is free, otherwise it parks the
//! requester in its waiting line. Releasing a unit hands it straight to the next
//! eligible waiter, so `in_use` never drops while someone is waiting. The caller
//! is responsible for resuming the patient the unit was handed to.

use std::collections::{HashSet, VecDeque};
use std::fmt;

use bevy_ecs::prelude::{Entity, Resource};
use serde::{Deserialize, Serialize};

use crate::error::SimulationFault;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PoolKind {
    PrepBay,
    OperatingRoom,
    RecoveryBed,
}

impl fmt::Display for PoolKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PoolKind::PrepBay => "preparation bay",
            PoolKind::OperatingRoom => "operating room",
            PoolKind::RecoveryBed => "recovery bed",
        };
        f.write_str(name)
    }
}

/// How a pool picks among waiters when a unit frees.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum QueueDiscipline {
    #[default]
    Fifo,
    /// Lowest priority number first, FIFO among equals. Never preempts a holder.
    Priority,
}

/// Priority key used by [`QueueDiscipline::Priority`]; lower is served first.
pub type Priority = u8;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct PendingRequest {
    requester: Entity,
    priority: Priority,
    seq: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Acquire {
    Granted,
    Queued { position: usize },
}

#[derive(Debug, Clone)]
pub struct ResourcePool {
    kind: PoolKind,
    capacity: usize,
    discipline: QueueDiscipline,
    holders: HashSet<Entity>,
    waiting: VecDeque<PendingRequest>,
    next_seq: u64,
    peak_in_use: usize,
    total_grants: u64,
}

impl ResourcePool {
    pub fn new(kind: PoolKind, capacity: usize, discipline: QueueDiscipline) -> Self {
        Self {
            kind,
            capacity,
            discipline,
            holders: HashSet::with_capacity(capacity),
            waiting: VecDeque::new(),
            next_seq: 0,
            peak_in_use: 0,
            total_grants: 0,
        }
    }

    pub fn kind(&self) -> PoolKind {
        self.kind
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn discipline(&self) -> QueueDiscipline {
        self.discipline
    }

    pub fn in_use(&self) -> usize {
        self.holders.len()
    }

    pub fn available(&self) -> usize {
        self.capacity - self.holders.len()
    }

    pub fn is_full(&self) -> bool {
        self.holders.len() >= self.capacity
    }

    /// Length of the waiting line (requests not yet granted).
    pub fn queue_len(&self) -> usize {
        self.waiting.len()
    }

    pub fn peak_in_use(&self) -> usize {
        self.peak_in_use
    }

    pub fn total_grants(&self) -> u64 {
        self.total_grants
    }

    pub fn holds(&self, requester: Entity) -> bool {
        self.holders.contains(&requester)
    }

    pub fn is_waiting(&self, requester: Entity) -> bool {
        self.waiting.iter().any(|r| r.requester == requester)
    }

    /// Request one unit for `requester`. `priority` is ignored under FIFO.
    pub fn acquire(
        &mut self,
        requester: Entity,
        priority: Priority,
    ) -> Result<Acquire, SimulationFault> {
        if self.holds(requester) || self.is_waiting(requester) {
            return Err(SimulationFault::DuplicateRequest {
                pool: self.kind,
                patient: requester,
            });
        }

        // A free unit with a non-empty line cannot happen: release hands units over directly.
        if !self.is_full() && self.waiting.is_empty() {
            self.grant(requester);
            return Ok(Acquire::Granted);
        }

        let seq = self.next_seq;
        self.next_seq += 1;
        self.waiting.push_back(PendingRequest {
            requester,
            priority,
            seq,
        });
        Ok(Acquire::Queued {
            position: self.waiting.len() - 1,
        })
    }

    /// Return the unit held by `holder`. If someone is waiting, the unit is
    /// granted to them on the spot and their entity is returned.
    pub fn release(&mut self, holder: Entity) -> Result<Option<Entity>, SimulationFault> {
        if !self.holders.remove(&holder) {
            return Err(SimulationFault::ReleaseNotHeld {
                pool: self.kind,
                patient: holder,
            });
        }

        let Some(index) = self.next_waiter_index() else {
            return Ok(None);
        };
        let Some(next) = self.waiting.remove(index) else {
            return Ok(None);
        };
        self.grant(next.requester);
        Ok(Some(next.requester))
    }

    fn next_waiter_index(&self) -> Option<usize> {
        match self.discipline {
            QueueDiscipline::Fifo => (!self.waiting.is_empty()).then_some(0),
            QueueDiscipline::Priority => self
                .waiting
                .iter()
                .enumerate()
                .min_by_key(|(_, r)| (r.priority, r.seq))
                .map(|(index, _)| index),
        }
    }

    fn grant(&mut self, requester: Entity) {
        self.holders.insert(requester);
        self.total_grants += 1;
        self.peak_in_use = self.peak_in_use.max(self.holders.len());
        debug_assert!(self.holders.len() <= self.capacity);
    }
}

/// The three pools a patient moves through, in order.
#[derive(Debug, Clone, Resource)]
pub struct ResourcePools {
    pub prep: ResourcePool,
    pub operating: ResourcePool,
    pub recovery: ResourcePool,
}

impl ResourcePools {
    pub fn new(
        prep_bays: usize,
        operating_rooms: usize,
        recovery_beds: usize,
        priority_scheduling: bool,
    ) -> Self {
        let staged = if priority_scheduling {
            QueueDiscipline::Priority
        } else {
            QueueDiscipline::Fifo
        };
        Self {
            prep: ResourcePool::new(PoolKind::PrepBay, prep_bays, staged),
            operating: ResourcePool::new(PoolKind::OperatingRoom, operating_rooms, staged),
            // Recovery is always first come, first served.
            recovery: ResourcePool::new(PoolKind::RecoveryBed, recovery_beds, QueueDiscipline::Fifo),
        }
    }

    pub fn get(&self, kind: PoolKind) -> &ResourcePool {
        match kind {
            PoolKind::PrepBay => &self.prep,
            PoolKind::OperatingRoom => &self.operating,
            PoolKind::RecoveryBed => &self.recovery,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &ResourcePool> {
        [&self.prep, &self.operating, &self.recovery].into_iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entity(n: u32) -> Entity {
        Entity::from_raw(n)
    }

    #[test]
    fn grants_until_capacity_then_queues() {
        let mut pool = ResourcePool::new(PoolKind::PrepBay, 2, QueueDiscipline::Fifo);
        assert_eq!(pool.acquire(entity(1), 1), Ok(Acquire::Granted));
        assert_eq!(pool.acquire(entity(2), 1), Ok(Acquire::Granted));
        assert_eq!(pool.acquire(entity(3), 1), Ok(Acquire::Queued { position: 0 }));
        assert_eq!(pool.acquire(entity(4), 1), Ok(Acquire::Queued { position: 1 }));
        assert_eq!(pool.in_use(), 2);
        assert_eq!(pool.available(), 0);
        assert_eq!(pool.queue_len(), 2);
    }

    #[test]
    fn release_hands_unit_to_oldest_waiter() {
        let mut pool = ResourcePool::new(PoolKind::OperatingRoom, 1, QueueDiscipline::Fifo);
        pool.acquire(entity(1), 1).expect("acquire");
        pool.acquire(entity(2), 0).expect("acquire");
        pool.acquire(entity(3), 0).expect("acquire");

        assert_eq!(pool.release(entity(1)), Ok(Some(entity(2))));
        assert!(pool.holds(entity(2)));
        assert_eq!(pool.in_use(), 1);
        assert_eq!(pool.release(entity(2)), Ok(Some(entity(3))));
        assert_eq!(pool.release(entity(3)), Ok(None));
        assert_eq!(pool.in_use(), 0);
        assert_eq!(pool.total_grants(), 3);
    }

    #[test]
    fn priority_pool_serves_emergencies_first_without_preemption() {
        let mut pool = ResourcePool::new(PoolKind::OperatingRoom, 1, QueueDiscipline::Priority);
        pool.acquire(entity(1), 1).expect("acquire");
        pool.acquire(entity(2), 1).expect("acquire");
        pool.acquire(entity(3), 1).expect("acquire");
        // Emergency arrives last but is granted first; the holder keeps its unit.
        pool.acquire(entity(4), 0).expect("acquire");
        assert!(pool.holds(entity(1)));

        assert_eq!(pool.release(entity(1)), Ok(Some(entity(4))));
        assert_eq!(pool.release(entity(4)), Ok(Some(entity(2))));
        assert_eq!(pool.release(entity(2)), Ok(Some(entity(3))));
    }

    #[test]
    fn releasing_unheld_unit_is_a_fault() {
        let mut pool = ResourcePool::new(PoolKind::RecoveryBed, 1, QueueDiscipline::Fifo);
        assert!(matches!(
            pool.release(entity(9)),
            Err(SimulationFault::ReleaseNotHeld { pool: PoolKind::RecoveryBed, .. })
        ));

        pool.acquire(entity(1), 1).expect("acquire");
        pool.release(entity(1)).expect("first release");
        assert!(matches!(
            pool.release(entity(1)),
            Err(SimulationFault::ReleaseNotHeld { .. })
        ));
    }

    #[test]
    fn duplicate_requests_are_rejected() {
        let mut pool = ResourcePool::new(PoolKind::PrepBay, 1, QueueDiscipline::Fifo);
        pool.acquire(entity(1), 1).expect("acquire");
        pool.acquire(entity(2), 1).expect("acquire");
        assert!(pool.acquire(entity(1), 1).is_err());
        assert!(pool.acquire(entity(2), 1).is_err());
    }

    #[test]
    fn peak_tracks_highest_occupancy() {
        let mut pool = ResourcePool::new(PoolKind::RecoveryBed, 3, QueueDiscipline::Fifo);
        pool.acquire(entity(1), 1).expect("acquire");
        pool.acquire(entity(2), 1).expect("acquire");
        pool.release(entity(1)).expect("release");
        pool.acquire(entity(3), 1).expect("acquire");
        assert_eq!(pool.peak_in_use(), 2);
        assert!(pool.peak_in_use() <= pool.capacity());
    }

    #[test]
    fn recovery_stays_fifo_under_priority_scheduling() {
        let pools = ResourcePools::new(3, 1, 2, true);
        assert_eq!(pools.prep.discipline(), QueueDiscipline::Priority);
        assert_eq!(pools.operating.discipline(), QueueDiscipline::Priority);
        assert_eq!(pools.recovery.discipline(), QueueDiscipline::Fifo);
    }
}
