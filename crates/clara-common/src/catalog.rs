//! The static service catalog and the operator's selection over it.
//!
//! The catalog never changes during a run. What changes is a [`Selection`],
//! a plain value holding one flag per catalog entry. The prompt produces it
//! and both deployment and health polling read their service list from the
//! same value, so the two lists cannot diverge.

use crate::types::{ServiceDescriptor, ServiceId};

/// Ordered list of deployable services.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Catalog {
    services: Vec<ServiceDescriptor>,
}

impl Catalog {
    /// Creates a catalog from an ordered list of descriptors.
    #[must_use]
    pub const fn new(services: Vec<ServiceDescriptor>) -> Self {
        Self { services }
    }

    /// The three services shipped with the installer.
    #[must_use]
    pub fn builtin() -> Self {
        Self::new(vec![
            ServiceDescriptor::new(
                "clara_comfyui",
                "ComfyUI",
                "AI Image Generation Powerhouse",
                8188,
                "/",
            ),
            ServiceDescriptor::new(
                "clara_python",
                "Python Backend",
                "Advanced AI Processing APIs",
                5001,
                "/health",
            ),
            ServiceDescriptor::new(
                "clara_n8n",
                "n8n Workflows",
                "Automation Made Simple",
                5678,
                "/healthz",
            ),
        ])
    }

    /// All descriptors in menu order.
    #[must_use]
    pub fn services(&self) -> &[ServiceDescriptor] {
        &self.services
    }

    /// Number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.services.len()
    }

    /// Whether the catalog has no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.services.is_empty()
    }

    /// Descriptors flagged in `selection`, in catalog order.
    #[must_use]
    pub fn selected<'a>(&'a self, selection: &'a Selection) -> Vec<&'a ServiceDescriptor> {
        self.services
            .iter()
            .zip(&selection.flags)
            .filter_map(|(svc, &on)| on.then_some(svc))
            .collect()
    }

    /// IDs flagged in `selection`, in catalog order.
    #[must_use]
    pub fn selected_ids(&self, selection: &Selection) -> Vec<ServiceId> {
        self.selected(selection)
            .into_iter()
            .map(|svc| svc.id.clone())
            .collect()
    }
}

/// Parsed operator answer to the selection prompt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Choice {
    /// Nothing but whitespace was entered.
    Empty,
    /// The wildcard token (`a` or `all`, any case).
    All,
    /// Every digit found in the input, as 1-based indices, in input order.
    Indices(Vec<usize>),
}

impl Choice {
    /// Interprets a raw line of operator input.
    ///
    /// Each ASCII digit is its own index, so `"13"` and `"1, 3"` mean the
    /// same thing. Every other character is ignored.
    #[must_use]
    pub fn parse(input: &str) -> Self {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return Self::Empty;
        }
        if trimmed.eq_ignore_ascii_case("a") || trimmed.eq_ignore_ascii_case("all") {
            return Self::All;
        }
        let indices = trimmed
            .chars()
            .filter_map(|c| c.to_digit(10))
            .map(|d| d as usize)
            .collect();
        Self::Indices(indices)
    }
}

/// One selection flag per catalog entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selection {
    flags: Vec<bool>,
}

impl Selection {
    /// A selection with nothing chosen.
    #[must_use]
    pub fn none(catalog: &Catalog) -> Self {
        Self {
            flags: vec![false; catalog.len()],
        }
    }

    /// Flags every entry.
    pub fn select_all(&mut self) {
        self.flags.iter_mut().for_each(|f| *f = true);
    }

    /// Clears all flags, then sets the ones named by 1-based `indices`.
    ///
    /// Out-of-range indices (including 0) are ignored.
    pub fn replace_with(&mut self, indices: &[usize]) {
        self.flags.iter_mut().for_each(|f| *f = false);
        for &index in indices {
            if let Some(flag) = index.checked_sub(1).and_then(|i| self.flags.get_mut(i)) {
                *flag = true;
            }
        }
    }

    /// Applies a parsed answer. `Empty` leaves the selection untouched.
    pub fn apply(&mut self, choice: &Choice) {
        match choice {
            Choice::Empty => {}
            Choice::All => self.select_all(),
            Choice::Indices(indices) => self.replace_with(indices),
        }
    }

    /// Whether the 0-based catalog position is flagged.
    #[must_use]
    pub fn is_selected(&self, position: usize) -> bool {
        self.flags.get(position).copied().unwrap_or(false)
    }

    /// Number of flagged entries.
    #[must_use]
    pub fn count(&self) -> usize {
        self.flags.iter().filter(|&&f| f).count()
    }

    /// Whether at least one entry is flagged.
    #[must_use]
    pub fn any(&self) -> bool {
        self.flags.iter().any(|&f| f)
    }
}
