use std::fmt;

use crate::error::{AsmError, Result};

/// Handle to a label slot inside an [`Assembler`](crate::Assembler).
///
/// Labels are cheap copyable indices. Any number of branches may refer to the
/// same label before or after it is placed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Label(u32);

impl Label {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "L{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LabelState {
    Unresolved,
    Resolved(u32),
}

#[derive(Debug, Clone)]
struct Slot {
    name: Option<String>,
    state: LabelState,
}

/// Write-once address cells, indexed by [`Label`].
#[derive(Debug, Clone, Default)]
pub struct LabelTable {
    slots: Vec<Slot>,
}

impl LabelTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn create(&mut self) -> Label {
        self.push(None)
    }

    pub fn create_named(&mut self, name: impl Into<String>) -> Label {
        self.push(Some(name.into()))
    }

    fn push(&mut self, name: Option<String>) -> Label {
        let label = Label(self.slots.len() as u32);
        self.slots.push(Slot {
            name,
            state: LabelState::Unresolved,
        });
        label
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    fn slot(&self, label: Label) -> Result<&Slot> {
        self.slots
            .get(label.index())
            .ok_or(AsmError::UnknownLabel { label })
    }

    pub fn state(&self, label: Label) -> Result<LabelState> {
        Ok(self.slot(label)?.state)
    }

    pub fn name(&self, label: Label) -> Option<&str> {
        self.slots.get(label.index())?.name.as_deref()
    }

    pub fn is_resolved(&self, label: Label) -> bool {
        matches!(self.state(label), Ok(LabelState::Resolved(_)))
    }

    /// Address of a placed label.
    pub fn address(&self, label: Label) -> Result<u32> {
        match self.slot(label)?.state {
            LabelState::Resolved(addr) => Ok(addr),
            LabelState::Unresolved => Err(AsmError::LabelNotAssigned { label }),
        }
    }

    /// Resolves `label` to `address`. The transition happens at most once.
    pub fn bind(&mut self, label: Label, address: i64) -> Result<()> {
        let addr = u32::try_from(address).map_err(|_| AsmError::InvalidAddress { address })?;
        let slot = self
            .slots
            .get_mut(label.index())
            .ok_or(AsmError::UnknownLabel { label })?;
        match slot.state {
            LabelState::Resolved(address) => Err(AsmError::LabelAlreadyAssigned { label, address }),
            LabelState::Unresolved => {
                slot.state = LabelState::Resolved(addr);
                Ok(())
            }
        }
    }

    /// Labels that were created but never placed.
    pub fn unresolved(&self) -> impl Iterator<Item = Label> + '_ {
        self.slots
            .iter()
            .enumerate()
            .filter(|(_, s)| s.state == LabelState::Unresolved)
            .map(|(i, _)| Label(i as u32))
    }
}
