/// Container state definitions for tracking mapping progress
use crate::model::{Container, LeafResource};
use crate::HarvestError;
use std::fmt;

/// Represents the current state of a container in the mapping process
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContainerState {
    /// Found on the gallery index; nothing fetched yet
    Discovered,

    /// Owner sub-directories listed
    Enumerated,

    /// Every owner listing processed; resource list is complete
    Resourced,

    /// Merged into the checkpoint store
    Checkpointed,
}

impl ContainerState {
    /// The only state reachable from this one
    pub fn next(&self) -> Option<Self> {
        match self {
            Self::Discovered => Some(Self::Enumerated),
            Self::Enumerated => Some(Self::Resourced),
            Self::Resourced => Some(Self::Checkpointed),
            Self::Checkpointed => None,
        }
    }

    pub fn can_transition_to(&self, to: Self) -> bool {
        self.next() == Some(to)
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Checkpointed)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Discovered => "discovered",
            Self::Enumerated => "enumerated",
            Self::Resourced => "resourced",
            Self::Checkpointed => "checkpointed",
        }
    }
}

impl fmt::Display for ContainerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A container being mapped, together with its lifecycle state
///
/// Resources are gathered on the side and only attached to the container
/// when it becomes `Resourced`, so a container is never observable with a
/// partial resource list.
#[derive(Debug)]
pub struct ContainerProgress {
    container: Container,
    state: ContainerState,
    owner_urls: Vec<(String, String)>,
    pending: Vec<LeafResource>,
}

impl ContainerProgress {
    pub fn discovered(container: Container) -> Self {
        Self {
            container,
            state: ContainerState::Discovered,
            owner_urls: Vec::new(),
            pending: Vec::new(),
        }
    }

    pub fn state(&self) -> ContainerState {
        self.state
    }

    pub fn container(&self) -> &Container {
        &self.container
    }

    fn advance(&mut self, to: ContainerState) -> Result<(), HarvestError> {
        if !self.state.can_transition_to(to) {
            return Err(HarvestError::InvalidTransition {
                from: self.state,
                to,
            });
        }
        self.state = to;
        Ok(())
    }

    /// Records the owner directories as (owner, url) pairs
    pub fn enumerated(&mut self, owners: Vec<(String, String)>) -> Result<(), HarvestError> {
        self.advance(ContainerState::Enumerated)?;
        self.owner_urls = owners;
        Ok(())
    }

    pub fn owners(&self) -> &[(String, String)] {
        &self.owner_urls
    }

    /// Adds one owner's resources; only valid while enumerated
    pub fn add_resources(&mut self, resources: Vec<LeafResource>) -> Result<(), HarvestError> {
        if self.state != ContainerState::Enumerated {
            return Err(HarvestError::InvalidTransition {
                from: self.state,
                to: ContainerState::Resourced,
            });
        }
        self.pending.extend(resources);
        Ok(())
    }

    /// Attaches all gathered resources to the container at once
    pub fn resourced(&mut self) -> Result<(), HarvestError> {
        self.advance(ContainerState::Resourced)?;
        let resources = std::mem::take(&mut self.pending);
        self.container.set_resources(resources);
        Ok(())
    }

    /// Hands the finished container to the checkpoint store
    pub fn checkpoint(mut self) -> Result<Container, HarvestError> {
        self.advance(ContainerState::Checkpointed)?;
        Ok(self.container)
    }
}
