//! Variable slots, frames and the frame set (GF / TF / LF stack).

use ippi_common::{FrameKind, Value, VarRef};
use std::collections::BTreeMap;
use thiserror::Error;
use tracing::debug;

/// Frame set failures, before an instruction index is attached.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FrameError {
    #[error("frame {0} is not initialized")]
    NotInitialized(FrameKind),

    #[error("no local frame to pop")]
    NoLocalFrame,

    #[error("undeclared variable {0}")]
    Undeclared(VarRef),

    #[error("variable {0} redeclared")]
    Redeclared(VarRef),
}

/// Storage cell for one variable. Starts out [`Value::Unset`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Slot {
    value: Value,
}

impl Default for Slot {
    fn default() -> Self {
        Self {
            value: Value::Unset,
        }
    }
}

impl Slot {
    /// True once any value has been assigned.
    pub fn is_initialized(&self) -> bool {
        self.value.is_set()
    }

    pub fn value(&self) -> &Value {
        &self.value
    }

    pub fn set(&mut self, value: Value) {
        self.value = value;
    }
}

/// A scope: variable name to slot.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Frame {
    slots: BTreeMap<String, Slot>,
}

impl Frame {
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Slots in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Slot)> {
        self.slots.iter().map(|(name, slot)| (name.as_str(), slot))
    }
}

/// The three scopes visible to a running program.
///
/// The global frame always exists. The temporary frame exists only between
/// CREATEFRAME and the next PUSHFRAME. Local frames form a stack whose top
/// is what `LF@` refers to.
#[derive(Debug, Clone, Default)]
pub struct FrameSet {
    global: Frame,
    temporary: Option<Frame>,
    locals: Vec<Frame>,
}

impl FrameSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// The frame a variable reference of this kind resolves to.
    pub fn frame(&self, kind: FrameKind) -> Result<&Frame, FrameError> {
        match kind {
            FrameKind::Global => Some(&self.global),
            FrameKind::Temporary => self.temporary.as_ref(),
            FrameKind::Local => self.locals.last(),
        }
        .ok_or(FrameError::NotInitialized(kind))
    }

    fn frame_mut(&mut self, kind: FrameKind) -> Result<&mut Frame, FrameError> {
        match kind {
            FrameKind::Global => Some(&mut self.global),
            FrameKind::Temporary => self.temporary.as_mut(),
            FrameKind::Local => self.locals.last_mut(),
        }
        .ok_or(FrameError::NotInitialized(kind))
    }

    /// CREATEFRAME: discard any temporary frame and start an empty one.
    pub fn create_temporary(&mut self) {
        if let Some(old) = self.temporary.replace(Frame::default()) {
            debug!(discarded = old.len(), "temporary frame recreated");
        }
    }

    /// PUSHFRAME: the temporary frame becomes the new top local frame.
    pub fn push_temporary(&mut self) -> Result<(), FrameError> {
        let frame = self
            .temporary
            .take()
            .ok_or(FrameError::NotInitialized(FrameKind::Temporary))?;
        self.locals.push(frame);
        debug!(depth = self.locals.len(), "local frame pushed");
        Ok(())
    }

    /// POPFRAME: the top local frame becomes the temporary frame.
    pub fn pop_local(&mut self) -> Result<(), FrameError> {
        let frame = self.locals.pop().ok_or(FrameError::NoLocalFrame)?;
        self.temporary = Some(frame);
        debug!(depth = self.locals.len(), "local frame popped");
        Ok(())
    }

    /// DEFVAR: create an uninitialized slot.
    pub fn declare(&mut self, var: &VarRef) -> Result<(), FrameError> {
        let frame = self.frame_mut(var.frame)?;
        if frame.slots.contains_key(&var.name) {
            return Err(FrameError::Redeclared(var.clone()));
        }
        frame.slots.insert(var.name.clone(), Slot::default());
        Ok(())
    }

    /// Look up a declared variable's slot.
    pub fn slot(&self, var: &VarRef) -> Result<&Slot, FrameError> {
        self.frame(var.frame)?
            .slots
            .get(&var.name)
            .ok_or_else(|| FrameError::Undeclared(var.clone()))
    }

    /// Overwrite a declared variable.
    pub fn assign(&mut self, var: &VarRef, value: Value) -> Result<(), FrameError> {
        let slot = self
            .frame_mut(var.frame)?
            .slots
            .get_mut(&var.name)
            .ok_or_else(|| FrameError::Undeclared(var.clone()))?;
        slot.set(value);
        Ok(())
    }

    pub fn global(&self) -> &Frame {
        &self.global
    }

    pub fn temporary(&self) -> Option<&Frame> {
        self.temporary.as_ref()
    }

    /// Number of local frames on the stack.
    pub fn local_depth(&self) -> usize {
        self.locals.len()
    }
}
