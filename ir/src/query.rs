//! Read-only traversal over an [`Ir`].
//!
//! A [`Filter`] is a value describing a test on an id; [`Filter::eval`] (and
//! the `Ir::is_kind*` helpers) apply it. [`Ir::id_iter`] and [`Ir::node_iter`]
//! walk a declaration list lazily, keeping its order and the ids that pass
//! every filter.

use std::fmt;

use crate::{
    ir::Ir,
    types::{Id, Kind, Node},
};

pub enum Filter<'a> {
    /// The node is exactly of this kind.
    Kind(Kind),
    /// The node is of one of these kinds.
    KindIn(Vec<Kind>),
    /// Any test over the id.
    Predicate(Box<dyn Fn(&str) -> bool + 'a>),
}

impl<'a> Filter<'a> {
    pub fn kind(kind: Kind) -> Self {
        Filter::Kind(kind)
    }

    pub fn kind_in<I: IntoIterator<Item = Kind>>(kinds: I) -> Self {
        Filter::KindIn(kinds.into_iter().collect())
    }

    pub fn predicate<F: Fn(&str) -> bool + 'a>(f: F) -> Self {
        Filter::Predicate(Box::new(f))
    }

    /// Keeps nodes whose declared name is `name`.
    pub fn name_eq(ir: &'a Ir, name: &'a str) -> Self {
        Filter::predicate(move |id| ir.lookup(id).name() == name)
    }

    pub fn eval(&self, ir: &Ir, id: &str) -> bool {
        match self {
            Filter::Kind(kind)   => ir.is_kind(*kind, id),
            Filter::KindIn(kinds) => ir.is_kind_in(kinds, id),
            Filter::Predicate(f) => f(id),
        }
    }
}

impl From<Kind> for Filter<'_> {
    fn from(kind: Kind) -> Self {
        Filter::Kind(kind)
    }
}

impl fmt::Debug for Filter<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Filter::Kind(kind)    => f.debug_tuple("Kind").field(kind).finish(),
            Filter::KindIn(kinds) => f.debug_tuple("KindIn").field(kinds).finish(),
            Filter::Predicate(_)  => f.write_str("Predicate(..)"),
        }
    }
}

impl Ir {
    /// Ids of `decl` passing all `filters`, in `decl` order. With no
    /// filters every id is kept.
    ///
    /// ```
    /// use protoboil_ir::{Filter, Ir, Kind};
    ///
    /// let ir = Ir::default();
    /// assert_eq!(ir.id_iter(ir.decl(), Some(Filter::kind(Kind::File))).count(), 0);
    /// ```
    pub fn id_iter<'a, F>(&'a self, decl: &'a [Id], filters: F) -> impl Iterator<Item = &'a str> + 'a
    where
        F: IntoIterator<Item = Filter<'a>>,
    {
        let filters: Vec<Filter<'a>> = filters.into_iter().collect();
        decl.iter()
            .map(String::as_str)
            .filter(move |id| filters.iter().all(|f| f.eval(self, id)))
    }

    /// Same walk as [`Ir::id_iter`], paired with the looked-up node.
    pub fn node_iter<'a, F>(
        &'a self,
        decl: &'a [Id],
        filters: F,
    ) -> impl Iterator<Item = (&'a Node, &'a str)> + 'a
    where
        F: IntoIterator<Item = Filter<'a>>,
    {
        self.id_iter(decl, filters).map(move |id| (self.lookup(id), id))
    }
}
