use std::fmt::Debug;

pub use fixed_map::Key;
use fixed_map::Map as FixedMap;

use crate::error::ConfigError;
use crate::membership::MembershipShape;

/// A closed set of linguistic labels for one variable, e.g. `low / medium / high`.
///
/// Implemented by the enums declared with [`labels!`](crate::labels).
pub trait Label: Key + Copy + Eq + Debug + 'static {
    /// Every label, in declaration order.
    const ALL: &'static [Self];

    fn name(self) -> &'static str;

    fn from_name(name: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|label| label.name() == name)
    }
}

/// Declares a label enum together with its [`Label`](crate::terms::Label) impl.
///
/// ```
/// hvac_fuzzy::labels! {
///     /// Fan speed
///     pub enum Fan {
///         Slow => "slow",
///         Fast => "fast",
///     }
/// }
///
/// use hvac_fuzzy::terms::Label;
///
/// assert_eq!(Fan::from_name("fast"), Some(Fan::Fast));
/// assert_eq!(Fan::Slow.to_string(), "slow");
/// ```
#[macro_export]
macro_rules! labels {
    (
        $(#[$meta:meta])*
        $vis:vis enum $name:ident {
            $($(#[$variant_meta:meta])* $variant:ident => $label:literal),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd, ::fixed_map::Key)]
        $vis enum $name {
            $($(#[$variant_meta])* $variant),+
        }

        impl $crate::terms::Label for $name {
            const ALL: &'static [Self] = &[$(Self::$variant),+];

            fn name(self) -> &'static str {
                match self {
                    $(Self::$variant => $label),+
                }
            }
        }

        impl ::std::fmt::Display for $name {
            fn fmt(&self, f: &mut ::std::fmt::Formatter<'_>) -> ::std::fmt::Result {
                f.write_str($crate::terms::Label::name(*self))
            }
        }
    };
}

/// Membership shapes keyed by a typed label.
pub struct Terms<L: Label>(pub(crate) FixedMap<L, MembershipShape>);

impl<L: Label> Terms<L> {
    pub fn new() -> Self {
        Self(FixedMap::new())
    }

    pub fn insert(&mut self, label: L, shape: MembershipShape) -> Option<MembershipShape> {
        self.0.insert(label, shape)
    }

    pub fn get(&self, label: L) -> Option<&MembershipShape> {
        self.0.get(label)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Shapes in label declaration order. Labels without a shape are skipped.
    pub fn iter(&self) -> impl Iterator<Item = (L, MembershipShape)> + '_ {
        L::ALL
            .iter()
            .filter_map(move |label| self.0.get(*label).map(|shape| (*label, *shape)))
    }

    /// Evenly partitions `[min, max]` across the labels, in declaration order.
    pub fn partition(min: f64, max: f64) -> Self {
        let mut terms = Self::new();

        for (label, shape) in L::ALL.iter().zip(MembershipShape::partition(min, max, L::ALL.len())) {
            terms.insert(*label, shape);
        }

        terms
    }

    /// Builds a term table from label names, as they appear in configuration.
    pub fn from_named<S: AsRef<str>>(
        variable: &str,
        named: impl IntoIterator<Item = (S, MembershipShape)>,
    ) -> Result<Self, ConfigError> {
        let mut terms = Self::new();

        for (name, shape) in named {
            let name = name.as_ref();
            let label = L::from_name(name).ok_or_else(|| ConfigError::UnknownTerm {
                variable: variable.to_owned(),
                label: name.to_owned(),
            })?;

            if terms.insert(label, shape).is_some() {
                return Err(ConfigError::DuplicateTerm {
                    variable: variable.to_owned(),
                    label: name.to_owned(),
                });
            }
        }

        Ok(terms)
    }

    /// The first label declared by `L` that has no shape, if any.
    pub(crate) fn first_missing(&self) -> Option<L> {
        L::ALL.iter().copied().find(|label| self.0.get(*label).is_none())
    }
}

impl<L: Label> Default for Terms<L> {
    fn default() -> Self {
        Self::new()
    }
}

impl<L: Label> Clone for Terms<L> {
    fn clone(&self) -> Self {
        let mut terms = Self::new();

        for (label, shape) in self.iter() {
            terms.insert(label, shape);
        }

        terms
    }
}

impl<L: Label> Debug for Terms<L> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}
