//! Named log and parameter variables.
//!
//! The host firmware owns the actual registry. At startup the driver binds
//! each of its atomics to a `group.name` pair through [`Registry::add`];
//! afterwards the host reads logs and writes parameters directly through the
//! atomics.

use heapless::Vec;
use portable_atomic::{AtomicU16, AtomicU32, Ordering};

/// Whether the host may write the variable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum VarKind {
    /// Read-only telemetry.
    Log,
    /// Runtime-settable parameter.
    Param,
}

/// Reference to the storage behind a variable.
#[derive(Debug, Clone, Copy)]
pub enum VarRef {
    U16(&'static AtomicU16),
    U32(&'static AtomicU32),
}

impl VarRef {
    #[must_use]
    pub fn load(&self) -> u32 {
        match self {
            VarRef::U16(v) => u32::from(v.load(Ordering::Relaxed)),
            VarRef::U32(v) => v.load(Ordering::Relaxed),
        }
    }

    fn store(&self, value: u32) -> Result<(), RegistryError> {
        match self {
            VarRef::U16(v) => {
                let value = u16::try_from(value).map_err(|_| RegistryError::OutOfRange)?;
                v.store(value, Ordering::Relaxed);
            }
            VarRef::U32(v) => v.store(value, Ordering::Relaxed),
        }
        Ok(())
    }
}

/// One registered variable.
#[derive(Debug, Clone, Copy)]
pub struct VarEntry {
    pub kind: VarKind,
    pub group: &'static str,
    pub name: &'static str,
    pub var: VarRef,
}

/// Error type for registry operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum RegistryError {
    /// No room for another entry.
    Full,
    /// `group.name` is already registered.
    Duplicate,
    /// No variable with that name.
    NotFound,
    /// Attempt to write a log variable.
    ReadOnly,
    /// Value does not fit the variable's width.
    OutOfRange,
}

/// Host-side registry of named variables.
pub trait Registry {
    /// Bind a named variable.
    fn add(&mut self, entry: VarEntry) -> Result<(), RegistryError>;
}

/// Bounded in-memory registry.
///
/// ```
/// use sgp_core::{BaselineParams, VarTable};
///
/// static PARAMS: BaselineParams = BaselineParams::new();
///
/// let mut table = VarTable::<4>::new();
/// PARAMS.register(&mut table).unwrap();
/// table.set_param("SGP40Baseline", "TVOC", 0x8C41).unwrap();
/// assert_eq!(PARAMS.tvoc(), 0x8C41);
/// ```
pub struct VarTable<const N: usize> {
    entries: Vec<VarEntry, N>,
}

impl<const N: usize> VarTable<N> {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// All entries in registration order.
    pub fn entries(&self) -> impl Iterator<Item = &VarEntry> {
        self.entries.iter()
    }

    /// Read-only telemetry entries.
    pub fn logs(&self) -> impl Iterator<Item = &VarEntry> {
        self.entries.iter().filter(|e| e.kind == VarKind::Log)
    }

    #[must_use]
    pub fn find(&self, group: &str, name: &str) -> Option<&VarEntry> {
        self.entries
            .iter()
            .find(|e| e.group == group && e.name == name)
    }

    /// Read any variable by name.
    pub fn get(&self, group: &str, name: &str) -> Result<u32, RegistryError> {
        self.find(group, name)
            .map(|e| e.var.load())
            .ok_or(RegistryError::NotFound)
    }

    /// Write a parameter by name.
    pub fn set_param(&self, group: &str, name: &str, value: u32) -> Result<(), RegistryError> {
        let entry = self.find(group, name).ok_or(RegistryError::NotFound)?;
        if entry.kind != VarKind::Param {
            return Err(RegistryError::ReadOnly);
        }
        entry.var.store(value)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<const N: usize> Default for VarTable<N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const N: usize> Registry for VarTable<N> {
    fn add(&mut self, entry: VarEntry) -> Result<(), RegistryError> {
        if self.find(entry.group, entry.name).is_some() {
            return Err(RegistryError::Duplicate);
        }
        self.entries.push(entry).map_err(|_| RegistryError::Full)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    static LOGGED: AtomicU16 = AtomicU16::new(7);
    static PARAM: AtomicU16 = AtomicU16::new(0);
    static WIDE: AtomicU32 = AtomicU32::new(0);

    fn entry(kind: VarKind, name: &'static str, var: VarRef) -> VarEntry {
        VarEntry {
            kind,
            group: "T",
            name,
            var,
        }
    }

    #[test]
    fn test_add_and_read() {
        let mut table = VarTable::<4>::new();
        table
            .add(entry(VarKind::Log, "a", VarRef::U16(&LOGGED)))
            .unwrap();
        assert_eq!(table.get("T", "a"), Ok(7));
        assert_eq!(table.get("T", "b"), Err(RegistryError::NotFound));
    }

    #[test]
    fn test_full_and_duplicate() {
        let mut table = VarTable::<1>::new();
        table
            .add(entry(VarKind::Log, "a", VarRef::U16(&LOGGED)))
            .unwrap();
        assert_eq!(
            table.add(entry(VarKind::Log, "a", VarRef::U16(&LOGGED))),
            Err(RegistryError::Duplicate)
        );
        assert_eq!(
            table.add(entry(VarKind::Log, "b", VarRef::U16(&LOGGED))),
            Err(RegistryError::Full)
        );
    }

    #[test]
    fn test_set_param_rules() {
        let mut table = VarTable::<4>::new();
        table
            .add(entry(VarKind::Log, "log", VarRef::U16(&LOGGED)))
            .unwrap();
        table
            .add(entry(VarKind::Param, "p", VarRef::U16(&PARAM)))
            .unwrap();
        table
            .add(entry(VarKind::Param, "w", VarRef::U32(&WIDE)))
            .unwrap();

        assert_eq!(table.set_param("T", "log", 1), Err(RegistryError::ReadOnly));
        assert_eq!(
            table.set_param("T", "p", 0x1_0000),
            Err(RegistryError::OutOfRange)
        );
        table.set_param("T", "p", 0xBEEF).unwrap();
        assert_eq!(PARAM.load(Ordering::Relaxed), 0xBEEF);
        table.set_param("T", "w", 0x1_0000).unwrap();
        assert_eq!(table.get("T", "w"), Ok(0x1_0000));
        assert_eq!(table.logs().count(), 1);
    }
}
