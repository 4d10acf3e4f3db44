//! MeshError: Unified error type for zone-mesh public APIs
//!
//! Every fallible operation in the crate reports through this enum. The
//! variants fall into the fatal classes the topology pipeline distinguishes:
//! malformed topology (bad connectivity, degenerate face keys, bad structured
//! regions), unclassified boundaries, and unregistered interfaces. Degenerate
//! face *geometry* is never an error; it is handled by the ghost fallback.

use thiserror::Error;

/// Unified error type for zone-mesh operations.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum MeshError {
    /// A face generated by an element repeats one of its nodes.
    #[error(
        "malformed topology: cell {cell} local face {local_face} repeats node {node} (face nodes {nodes:?})"
    )]
    DegenerateFace {
        cell: usize,
        local_face: usize,
        node: usize,
        nodes: Vec<usize>,
    },
    /// A face key was claimed by more than two cells, or twice by one cell.
    #[error(
        "malformed topology: face {face} (nodes {nodes:?}) already has cells {left} and {right:?}, cell {cell} cannot claim it"
    )]
    NonManifoldFace {
        face: usize,
        nodes: Vec<usize>,
        left: usize,
        right: Option<usize>,
        cell: usize,
    },
    /// An element has the wrong number of nodes for its type.
    #[error("malformed topology: cell {cell} of type {cell_type} expects {expected} nodes, got {found}")]
    CellNodeCount {
        cell: usize,
        cell_type: String,
        expected: usize,
        found: usize,
    },
    /// An element references a node outside the node table.
    #[error("malformed topology: cell {cell} references node {node}, but the zone has {node_count} nodes")]
    NodeOutOfRange {
        cell: usize,
        node: usize,
        node_count: usize,
    },
    /// A structured boundary region is not a plane or exceeds the block.
    #[error(
        "malformed topology: region i[{ist}..={ied}] j[{jst}..={jed}] k[{kst}..={ked}] {reason}"
    )]
    InvalidRegion {
        ist: usize,
        ied: usize,
        jst: usize,
        jed: usize,
        kst: usize,
        ked: usize,
        reason: &'static str,
    },
    /// A boundary face matched no boundary patch.
    #[error("unclassified boundary: face {face} with nodes {nodes:?} matches no boundary patch")]
    UnclassifiedBoundary { face: usize, nodes: Vec<usize> },
    /// A boundary face matched several patches and overlaps are rejected.
    #[error("boundary face {face} matches both patch `{first}` and patch `{second}`")]
    OverlappingPatches {
        face: usize,
        first: String,
        second: String,
    },
    /// A global interface id is not registered for the zone.
    #[error("unregistered interface: global id {global_id} is not known to zone {zone}")]
    UnregisteredInterface { zone: usize, global_id: usize },
    /// A global interface id was registered twice in one zone.
    #[error("duplicate interface: global id {global_id} already registered in zone {zone} as local {local}")]
    DuplicateInterface {
        zone: usize,
        global_id: usize,
        local: usize,
    },
    /// The registry has no group for the requested neighbor zone.
    #[error("zone {zone} has no interface group for neighbor zone {neighbor}")]
    MissingNeighborGroup { zone: usize, neighbor: usize },
    /// Reciprocal resolution was attempted before grouping.
    #[error("zone {zone}: interface groups are not built (group_by_neighbor must run first)")]
    InterfaceGroupsNotBuilt { zone: usize },
    /// A receive order does not match the neighbor group it is recorded for.
    #[error("zone {zone}: receive order from neighbor zone {neighbor} rejected: {reason}")]
    ReceiveOrder {
        zone: usize,
        neighbor: usize,
        reason: String,
    },
    /// Inconsistent face-search data while splitting interface faces.
    #[error("face link: {0}")]
    FaceLinkMismatch(String),
    /// Two parallel arrays disagree in length.
    #[error("length mismatch for {what}: expected {expected}, found {found}")]
    LengthMismatch {
        what: &'static str,
        expected: usize,
        found: usize,
    },
    /// A cell is assigned to a part id outside `0..cell_count`.
    #[error("cell {cell} assigned to part {part}, part ids must be below {limit}")]
    PartitionOutOfRange {
        cell: usize,
        part: usize,
        limit: usize,
    },
    /// Invalid geometric input (bad extents, unsupported dimension...).
    #[error("invalid geometry: {0}")]
    InvalidGeometry(String),
    /// Persisted mesh data could not be decoded.
    #[error("mesh I/O parse error: {0}")]
    MeshIoParse(String),
    /// Underlying reader/writer failure.
    #[error("I/O error: {0}")]
    Io(String),
}

impl MeshError {
    /// True for the malformed-topology class of fatal errors.
    pub fn is_malformed_topology(&self) -> bool {
        matches!(
            self,
            MeshError::DegenerateFace { .. }
                | MeshError::NonManifoldFace { .. }
                | MeshError::CellNodeCount { .. }
                | MeshError::NodeOutOfRange { .. }
                | MeshError::InvalidRegion { .. }
        )
    }
}

impl From<std::io::Error> for MeshError {
    fn from(err: std::io::Error) -> Self {
        MeshError::Io(err.to_string())
    }
}
