//! The four C-MAPSS batches and their fixed operating metadata.

use std::fmt;

/// Operating conditions and fault modes a batch was simulated under.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BatchMeta {
    pub conditions: &'static str,
    pub fault_modes: &'static str,
}

const SEA_LEVEL: &str = "ONE (Sea Level)";
const SIX_CONDITIONS: &str = "SIX";
const HPC_ONLY: &str = "ONE (HPC Degradation)";
const HPC_AND_FAN: &str = "TWO (HPC Degradation, Fan Degradation)";

/// One of the four dataset batches (`FD001` .. `FD004`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum BatchIndex {
    Fd001,
    Fd002,
    Fd003,
    Fd004,
}

impl BatchIndex {
    /// Every batch, in assembly order.
    pub const ALL: [BatchIndex; 4] = [
        BatchIndex::Fd001,
        BatchIndex::Fd002,
        BatchIndex::Fd003,
        BatchIndex::Fd004,
    ];

    /// 1-based batch number.
    pub fn number(self) -> u8 {
        match self {
            Self::Fd001 => 1,
            Self::Fd002 => 2,
            Self::Fd003 => 3,
            Self::Fd004 => 4,
        }
    }

    pub fn meta(self) -> BatchMeta {
        match self {
            Self::Fd001 => BatchMeta {
                conditions: SEA_LEVEL,
                fault_modes: HPC_ONLY,
            },
            Self::Fd002 => BatchMeta {
                conditions: SIX_CONDITIONS,
                fault_modes: HPC_ONLY,
            },
            Self::Fd003 => BatchMeta {
                conditions: SEA_LEVEL,
                fault_modes: HPC_AND_FAN,
            },
            Self::Fd004 => BatchMeta {
                conditions: SIX_CONDITIONS,
                fault_modes: HPC_AND_FAN,
            },
        }
    }

    /// Raw trace file for the given partition, e.g. `train_FD001.txt`.
    pub fn data_file(self, partition: Partition) -> String {
        format!("{}_{}.txt", partition.file_prefix(), self)
    }

    /// Ground-truth RUL file for the test partition, e.g. `RUL_FD001.txt`.
    pub fn ground_truth_file(self) -> String {
        format!("RUL_{self}.txt")
    }
}

impl fmt::Display for BatchIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "FD{:03}", self.number())
    }
}

/// Train traces run through failure; test traces are truncated before it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Partition {
    Train,
    Test,
}

impl Partition {
    fn file_prefix(self) -> &'static str {
        match self {
            Self::Train => "train",
            Self::Test => "test",
        }
    }
}

impl fmt::Display for Partition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.file_prefix())
    }
}
