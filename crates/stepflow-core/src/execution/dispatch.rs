//! Dispatch tables for the Activate/Return protocol.
//!
//! The executor never matches on step kinds directly. For each kind it
//! looks up what to do when the step is activated from upstream and what
//! to do when control returns to it from downstream. Both tables are
//! indexed by [`StepKind::ordinal`].

use std::fmt;
use std::sync::OnceLock;

use super::error::DispatchTableError;
use super::step::StepKind;

/// Direction of control flow at an instruction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Phase {
    /// Control arrives from upstream with fresh input.
    Activate,
    /// Control arrives from downstream after it consumed the last chunk.
    Return,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Phase::Activate => f.write_str("Activate"),
            Phase::Return => f.write_str("Return"),
        }
    }
}

/// What to do when a step is activated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActivateTarget {
    /// The run is complete.
    Terminate,
    /// Turn around and return to the upstream step.
    BeginReturn,
    /// Reset, execute, then activate the downstream step.
    Execute,
}

/// What to do when control returns to a step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReturnTarget {
    /// The run is complete.
    Terminate,
    /// Keep returning upstream.
    PassUpstream,
    /// Produce another chunk if there is one, else return upstream.
    Resume,
}

/// Collects targets before the tables are frozen.
#[derive(Debug, Clone)]
pub struct DispatchTableBuilder {
    activate: [Option<ActivateTarget>; StepKind::COUNT],
    on_return: [Option<ReturnTarget>; StepKind::COUNT],
}

impl DispatchTableBuilder {
    /// Creates a builder with every entry unset.
    #[must_use]
    pub fn new() -> Self {
        Self {
            activate: [None; StepKind::COUNT],
            on_return: [None; StepKind::COUNT],
        }
    }

    /// Registers the targets of `kind`, replacing earlier ones.
    pub fn register(
        &mut self,
        kind: StepKind,
        activate: ActivateTarget,
        on_return: ReturnTarget,
    ) -> &mut Self {
        self.activate[kind.ordinal()] = Some(activate);
        self.on_return[kind.ordinal()] = Some(on_return);
        self
    }

    /// Registers only the Activate target of `kind`.
    pub fn register_activate(&mut self, kind: StepKind, target: ActivateTarget) -> &mut Self {
        self.activate[kind.ordinal()] = Some(target);
        self
    }

    /// Registers only the Return target of `kind`.
    pub fn register_return(&mut self, kind: StepKind, target: ReturnTarget) -> &mut Self {
        self.on_return[kind.ordinal()] = Some(target);
        self
    }

    /// Freezes the tables.
    ///
    /// `Start` must terminate in both phases and `End` must turn around on
    /// Activate; any other sentinel target would walk control off the
    /// step array.
    ///
    /// # Errors
    ///
    /// Returns [`DispatchTableError::MissingTarget`] for the first kind
    /// without a target, checking Activate before Return, then
    /// [`DispatchTableError::InvalidSentinelTarget`] for a bad sentinel entry.
    pub fn build(&self) -> Result<DispatchTables, DispatchTableError> {
        let tables = self.complete()?;
        let start = StepKind::Start;
        if tables.activate(start) != ActivateTarget::Terminate {
            return Err(DispatchTableError::InvalidSentinelTarget {
                kind: start,
                phase: Phase::Activate,
            });
        }
        if tables.on_return(start) != ReturnTarget::Terminate {
            return Err(DispatchTableError::InvalidSentinelTarget {
                kind: start,
                phase: Phase::Return,
            });
        }
        if tables.activate(StepKind::End) != ActivateTarget::BeginReturn {
            return Err(DispatchTableError::InvalidSentinelTarget {
                kind: StepKind::End,
                phase: Phase::Activate,
            });
        }
        Ok(tables)
    }

    /// Freezes the tables without checking the sentinel entries.
    #[cfg(test)]
    pub(crate) fn build_unchecked(&self) -> Result<DispatchTables, DispatchTableError> {
        self.complete()
    }

    fn complete(&self) -> Result<DispatchTables, DispatchTableError> {
        let mut activate = [ActivateTarget::Terminate; StepKind::COUNT];
        let mut on_return = [ReturnTarget::Terminate; StepKind::COUNT];
        for kind in StepKind::ALL {
            let i = kind.ordinal();
            activate[i] = self.activate[i].ok_or(DispatchTableError::MissingTarget {
                kind,
                phase: Phase::Activate,
            })?;
            on_return[i] = self.on_return[i].ok_or(DispatchTableError::MissingTarget {
                kind,
                phase: Phase::Return,
            })?;
        }
        Ok(DispatchTables {
            activate,
            on_return,
        })
    }
}

impl Default for DispatchTableBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Frozen, complete dispatch tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DispatchTables {
    activate: [ActivateTarget; StepKind::COUNT],
    on_return: [ReturnTarget; StepKind::COUNT],
}

impl DispatchTables {
    /// Returns the process-wide tables, building them on first use.
    ///
    /// # Panics
    ///
    /// Panics if the standard registration leaves an entry unset.
    pub fn global() -> &'static DispatchTables {
        static TABLES: OnceLock<DispatchTables> = OnceLock::new();
        TABLES.get_or_init(|| match Self::standard().build() {
            Ok(tables) => tables,
            Err(err) => panic!("invalid dispatch tables: {err}"),
        })
    }

    /// Returns a builder holding the standard registration for every kind.
    #[must_use]
    pub fn standard() -> DispatchTableBuilder {
        let mut builder = DispatchTableBuilder::new();
        for kind in StepKind::ALL {
            let (activate, on_return) = match kind {
                StepKind::Start => (ActivateTarget::Terminate, ReturnTarget::Terminate),
                StepKind::End => (ActivateTarget::BeginReturn, ReturnTarget::PassUpstream),
                StepKind::ScanNodes
                | StepKind::ScanNodesByLabel
                | StepKind::ScanEdges
                | StepKind::GetOutEdges
                | StepKind::GetLabelSetId
                | StepKind::Filter
                | StepKind::Transform
                | StepKind::Count
                | StepKind::Materialize
                | StepKind::GetNodePropertyInt64
                | StepKind::GetNodePropertyUInt64
                | StepKind::GetNodePropertyDouble
                | StepKind::GetNodePropertyString
                | StepKind::GetNodePropertyBool
                | StepKind::GetEdgePropertyInt64
                | StepKind::GetEdgePropertyUInt64
                | StepKind::GetEdgePropertyDouble
                | StepKind::GetEdgePropertyString
                | StepKind::GetEdgePropertyBool
                | StepKind::Lambda
                | StepKind::JsonEncoder
                | StepKind::DebugDump
                | StepKind::CreateGraph
                | StepKind::ListGraphs => (ActivateTarget::Execute, ReturnTarget::Resume),
            };
            builder.register(kind, activate, on_return);
        }
        builder
    }

    /// Returns the Activate target of `kind`.
    #[inline]
    #[must_use]
    pub fn activate(&self, kind: StepKind) -> ActivateTarget {
        self.activate[kind.ordinal()]
    }

    /// Returns the Return target of `kind`.
    #[inline]
    #[must_use]
    pub fn on_return(&self, kind: StepKind) -> ReturnTarget {
        self.on_return[kind.ordinal()]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_standard_tables() {
        let tables = DispatchTables::global();
        assert_eq!(tables.activate(StepKind::Start), ActivateTarget::Terminate);
        assert_eq!(tables.on_return(StepKind::Start), ReturnTarget::Terminate);
        assert_eq!(tables.activate(StepKind::End), ActivateTarget::BeginReturn);
        assert_eq!(tables.on_return(StepKind::End), ReturnTarget::PassUpstream);
        for kind in StepKind::ALL.iter().filter(|k| !k.is_sentinel()) {
            assert_eq!(tables.activate(*kind), ActivateTarget::Execute);
            assert_eq!(tables.on_return(*kind), ReturnTarget::Resume);
        }
    }

    #[test]
    fn test_global_is_shared() {
        assert!(std::ptr::eq(DispatchTables::global(), DispatchTables::global()));
    }

    #[test]
    fn test_missing_activate_target() {
        let mut builder = DispatchTableBuilder::new();
        for kind in StepKind::ALL {
            if kind != StepKind::Count {
                builder.register(kind, ActivateTarget::Execute, ReturnTarget::Resume);
            }
        }
        builder.register_return(StepKind::Count, ReturnTarget::Resume);

        assert_eq!(
            builder.build(),
            Err(DispatchTableError::MissingTarget {
                kind: StepKind::Count,
                phase: Phase::Activate,
            })
        );
    }

    #[test]
    fn test_missing_return_target() {
        let mut builder = DispatchTables::standard();
        builder.on_return[StepKind::Lambda.ordinal()] = None;

        assert_eq!(
            builder.build(),
            Err(DispatchTableError::MissingTarget {
                kind: StepKind::Lambda,
                phase: Phase::Return,
            })
        );
    }

    #[test]
    fn test_empty_builder_reports_first_kind() {
        let err = DispatchTableBuilder::new().build().unwrap_err();
        assert_eq!(
            err,
            DispatchTableError::MissingTarget {
                kind: StepKind::Start,
                phase: Phase::Activate,
            }
        );
    }

    #[test]
    fn test_end_must_turn_around() {
        let mut builder = DispatchTables::standard();
        builder.register(StepKind::End, ActivateTarget::Execute, ReturnTarget::Resume);

        assert_eq!(
            builder.build(),
            Err(DispatchTableError::InvalidSentinelTarget {
                kind: StepKind::End,
                phase: Phase::Activate,
            })
        );
    }

    #[test]
    fn test_start_must_terminate() {
        let mut builder = DispatchTables::standard();
        builder.register_return(StepKind::Start, ReturnTarget::Resume);
        assert_eq!(
            builder.build(),
            Err(DispatchTableError::InvalidSentinelTarget {
                kind: StepKind::Start,
                phase: Phase::Return,
            })
        );

        builder.register(StepKind::Start, ActivateTarget::Execute, ReturnTarget::Terminate);
        assert_eq!(
            builder.build(),
            Err(DispatchTableError::InvalidSentinelTarget {
                kind: StepKind::Start,
                phase: Phase::Activate,
            })
        );
    }

    #[test]
    fn test_missing_target_reported_before_sentinels() {
        let mut builder = DispatchTableBuilder::new();
        for kind in StepKind::ALL {
            if kind != StepKind::Filter {
                builder.register(kind, ActivateTarget::Execute, ReturnTarget::Resume);
            }
        }

        assert_eq!(
            builder.build(),
            Err(DispatchTableError::MissingTarget {
                kind: StepKind::Filter,
                phase: Phase::Activate,
            })
        );
    }
}
