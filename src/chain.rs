//! Dependency chains: simple paths through a sentence's dependency graph.

use itertools::Itertools;
use std::collections::BTreeSet;
use std::fmt;
use tracing::trace;

use crate::error::{Error, Result};
use crate::models::Dependency;

/// An ordered, non-empty run of dependencies where each edge starts at the
/// previous edge's dependent and no pair of edges touches a governor of an
/// earlier edge.
///
/// Chains are persistent: [`Chain::append`] builds a new chain and never
/// touches the receiver.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Chain {
    dependencies: Vec<Dependency>,
    /// Path nodes: every governor, then the last dependent.
    word_ids: Vec<u32>,
}

impl Chain {
    pub fn new(dependencies: Vec<Dependency>) -> Result<Self> {
        let Some(last) = dependencies.last() else {
            return Err(Error::validation("cannot build a chain from an empty dependency list"));
        };

        // ids of governors of the edges before the current pair
        let mut seen: Vec<u32> = Vec::with_capacity(dependencies.len() + 1);
        for (first, second) in dependencies.iter().tuple_windows() {
            if !links(first, second, &seen) {
                return Err(Error::validation(format!(
                    "chain invariants do not hold between {first} and {second}"
                )));
            }
            seen.push(first.governor().id());
        }

        let word_ids = dependencies
            .iter()
            .map(|d| d.governor().id())
            .chain(std::iter::once(last.dependent().id()))
            .collect();

        Ok(Self {
            dependencies,
            word_ids,
        })
    }

    /// Returns a new chain with `dep` appended; fails if `dep` does not
    /// continue the last edge or revisits a word already on the path.
    pub fn append(&self, dep: Dependency) -> Result<Chain> {
        let last = self.last();
        if last.dependent().id() != dep.governor().id() || self.word_ids.contains(&dep.dependent().id()) {
            return Err(Error::validation(format!("chain invariant violated for {dep}")));
        }

        let mut dependencies = self.dependencies.clone();
        dependencies.push(dep);
        Chain::new(dependencies)
    }

    /// Relation labels joined by `#`, e.g. `mod#mod`.
    pub fn chain_type(&self) -> String {
        self.dependencies.iter().map(|d| d.relation()).join("#")
    }

    pub fn first(&self) -> &Dependency {
        &self.dependencies[0]
    }

    pub fn last(&self) -> &Dependency {
        &self.dependencies[self.dependencies.len() - 1]
    }

    pub fn dependencies(&self) -> &[Dependency] {
        &self.dependencies
    }

    pub fn word_ids(&self) -> &[u32] {
        &self.word_ids
    }

    #[allow(clippy::len_without_is_empty)]
    pub fn len(&self) -> usize {
        self.dependencies.len()
    }
}

fn links(first: &Dependency, second: &Dependency, seen: &[u32]) -> bool {
    let (a, b, c) = (first.governor().id(), first.dependent().id(), second.dependent().id());
    first.dependent().id() == second.governor().id()
        && !seen.contains(&a)
        && !seen.contains(&b)
        && !seen.contains(&c)
}

impl fmt::Display for Chain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.dependencies.iter().join("#"))
    }
}

/// All two-edge chains `first#second` where `second` leaves `first`'s
/// dependent. `all_deps` may or may not contain `first`.
pub fn all_chains_from_first<'a, I>(first: &Dependency, all_deps: I) -> BTreeSet<Chain>
where
    I: IntoIterator<Item = &'a Dependency>,
{
    let candidates: BTreeSet<&Dependency> = all_deps.into_iter().filter(|d| *d != first).collect();

    candidates
        .into_iter()
        .filter(|second| second.governor().same_token(first.dependent()))
        .filter_map(|second| match Chain::new(vec![first.clone(), second.clone()]) {
            Ok(chain) => Some(chain),
            Err(e) => {
                trace!("Skipping chain candidate - {}", e);
                None
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dep(raw: &str) -> Dependency {
        raw.parse().unwrap()
    }

    fn dep_1() -> Dependency {
        dep("mod(obésité-5-NC,hypertension-9-NC)")
    }
    fn dep_2() -> Dependency {
        dep("mod(hypertension-9-NC,arthrose-13-NC)")
    }
    fn dep_3() -> Dependency {
        dep("mod(arthrose-13-NC,mauvaise-12-ADJ)")
    }
    fn dep_4() -> Dependency {
        dep("dep(hypertension-9-NC,morbide-17-ADJ)")
    }
    fn dep_bad() -> Dependency {
        dep("mod(obésité-5-NC,diabète-7-NC)")
    }

    #[test]
    fn two_linked_deps_build_in_order() -> Result<()> {
        let chain = Chain::new(vec![dep_1(), dep_2()])?;
        assert_eq!(chain.dependencies(), &[dep_1(), dep_2()]);
        assert_eq!(chain.word_ids(), &[5, 9, 13]);
        assert_eq!(chain.first(), &dep_1());
        assert_eq!(chain.last(), &dep_2());
        Ok(())
    }

    #[test]
    fn three_linked_deps_build() -> Result<()> {
        let chain = Chain::new(vec![dep_1(), dep_2(), dep_3()])?;
        assert_eq!(chain.len(), 3);
        assert_eq!(chain.chain_type(), "mod#mod#mod");
        Ok(())
    }

    #[test]
    fn empty_list_is_rejected() {
        assert!(matches!(Chain::new(vec![]), Err(Error::Validation(_))));
    }

    #[test]
    fn wrong_order_is_rejected() {
        assert!(Chain::new(vec![dep_2(), dep_1()]).is_err());
    }

    #[test]
    fn reused_word_id_is_rejected() {
        let result = Chain::new(vec![dep_1(), dep_2(), dep_3(), dep_bad()]);
        assert!(matches!(result, Err(Error::Validation(_))));
    }

    #[test]
    fn cycle_back_to_an_earlier_governor_is_rejected() {
        let back = dep("mod(arthrose-13-NC,obésité-5-NC)");
        assert!(Chain::new(vec![dep_1(), dep_2(), back]).is_err());
    }

    #[test]
    fn self_loops_only_need_to_link() -> Result<()> {
        let loop_edge = dep("dep(tuer-1-VINF,tuer-1-VINF)");
        let obj = dep("obj(tuer-1-VINF,maladie-2-NC)");

        assert_eq!(Chain::new(vec![loop_edge.clone()])?.word_ids(), &[1, 1]);
        let chain = Chain::new(vec![loop_edge.clone(), obj.clone()])?;
        assert_eq!(chain.chain_type(), "dep#obj");
        assert_eq!(all_chains_from_first(&loop_edge, &[loop_edge.clone(), obj]), BTreeSet::from([chain]));
        Ok(())
    }

    #[test]
    fn append_returns_new_chain() -> Result<()> {
        let chain = Chain::new(vec![dep_1()])?;
        let longer = chain.append(dep_2())?;

        assert_eq!(chain.len(), 1);
        assert_eq!(longer.len(), 2);
        assert_eq!(longer, Chain::new(vec![dep_1(), dep_2()])?);
        Ok(())
    }

    #[test]
    fn failed_append_leaves_chain_unchanged() -> Result<()> {
        let chain = Chain::new(vec![dep_1(), dep_2(), dep_3()])?;
        let before = chain.clone();

        assert!(chain.append(dep_bad()).is_err());
        // continues from 12 but comes back to 9
        assert!(chain.append(dep("mod(mauvaise-12-ADJ,hypertension-9-NC)")).is_err());

        assert_eq!(chain, before);
        assert_eq!(chain.to_string(), before.to_string());
        Ok(())
    }

    #[test]
    fn string_form_and_type() -> Result<()> {
        let chain = Chain::new(vec![dep_1(), dep_2()])?;
        assert_eq!(chain.chain_type(), "mod#mod");
        assert_eq!(chain.to_string(), "mod(obésité-5,hypertension-9)#mod(hypertension-9,arthrose-13)");
        Ok(())
    }

    #[test]
    fn discovery_finds_two_edge_chains() -> Result<()> {
        let all = [dep_1(), dep_2(), dep_4()];
        let actual = all_chains_from_first(&dep_1(), &all);
        let expected: BTreeSet<Chain> = [
            Chain::new(vec![dep_1(), dep_2()])?,
            Chain::new(vec![dep_1(), dep_4()])?,
        ]
        .into_iter()
        .collect();
        assert_eq!(actual, expected);
        Ok(())
    }

    #[test]
    fn discovery_stops_at_two_edges() -> Result<()> {
        let all = [dep_1(), dep_2(), dep_3(), dep_4()];
        let actual = all_chains_from_first(&dep_1(), &all);
        let expected: BTreeSet<Chain> = [
            Chain::new(vec![dep_1(), dep_2()])?,
            Chain::new(vec![dep_1(), dep_4()])?,
        ]
        .into_iter()
        .collect();
        assert_eq!(actual, expected);
        assert!(actual.iter().all(|c| c.len() == 2 && c.first() == &dep_1()));
        Ok(())
    }

    #[test]
    fn discovery_without_seed_in_set() {
        let all = [dep_2(), dep_2(), dep_4()];
        assert_eq!(all_chains_from_first(&dep_1(), &all).len(), 2);
    }

    #[test]
    fn discovery_requires_same_token() {
        // same id, different text: not the same word
        let other = dep("mod(tension-9-NC,arthrose-13-NC)");
        assert!(all_chains_from_first(&dep_1(), &[other]).is_empty());
    }
}
