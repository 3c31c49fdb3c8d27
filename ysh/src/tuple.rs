//! Exclusively owned cons tuples
//!
//! A tuple is either empty or a node holding a head value and the tail tuple
//! it owns. Nodes are never shared: cloning copies every node, and dropping
//! walks the chain in a loop so arbitrarily long tuples cannot blow the stack.

use std::cmp::Ordering;
use std::fmt;

use crate::error::Fault;
use crate::value::Value;

#[derive(Default)]
pub struct Tuple {
    head: Option<Box<Node>>,
}

struct Node {
    value: Value,
    tail: Tuple,
}

impl Tuple {
    pub const fn new() -> Self {
        Self { head: None }
    }

    /// Whether this is the empty tuple.
    pub const fn is_empty(&self) -> bool {
        self.head.is_none()
    }

    /// Prepend one element in O(1).
    ///
    /// Pushing `e1, e2, .., en` onto an empty tuple yields `(en, .., e2, e1)`.
    pub fn push(&mut self, elem: Value) {
        let tail = Self {
            head: self.head.take(),
        };
        self.head = Some(Box::new(Node { value: elem, tail }));
    }

    /// The head element, if any.
    pub fn value(&self) -> Option<&Value> {
        self.head.as_ref().map(|node| &node.value)
    }

    /// The head element together with the tail it owns.
    pub fn content(&self) -> Option<(&Value, &Self)> {
        self.head.as_ref().map(|node| (&node.value, &node.tail))
    }

    pub fn iter(&self) -> Iter<'_> {
        Iter {
            next: self.head.as_deref(),
        }
    }

    pub fn len(&self) -> usize {
        self.iter().count()
    }

    /// Elements in head-to-tail order.
    pub fn to_list(&self) -> Vec<Value> {
        self.iter().cloned().collect()
    }

    /// `(h1, t1..) concat (h2, t2..) = (h1, t1.., h2, t2..)`.
    ///
    /// Copies `other` once and pushes this tuple's elements in reverse, so the
    /// cost beyond the copy is O(len(self)).
    pub fn concat(&self, other: &Self) -> Self {
        let mut result = other.clone();
        let elems: Vec<&Value> = self.iter().collect();
        for elem in elems.into_iter().rev() {
            result.push(elem.clone());
        }
        result
    }

    /// Pairwise equality; tuples of different length are unequal.
    pub fn try_eq(&self, other: &Self) -> Result<bool, Fault> {
        let mut lhs = self.iter();
        let mut rhs = other.iter();
        loop {
            match (lhs.next(), rhs.next()) {
                (Some(l), Some(r)) => {
                    if !l.try_eq(r)? {
                        return Ok(false);
                    }
                }
                (None, None) => return Ok(true),
                _ => return Ok(false),
            }
        }
    }

    /// Lexicographic ordering; a strict prefix orders before the longer tuple.
    pub fn try_partial_cmp(&self, other: &Self) -> Result<Option<Ordering>, Fault> {
        let mut lhs = self.iter();
        let mut rhs = other.iter();
        loop {
            match (lhs.next(), rhs.next()) {
                (Some(l), Some(r)) => match l.try_partial_cmp(r)? {
                    Some(Ordering::Equal) => {}
                    other => return Ok(other),
                },
                (None, None) => return Ok(Some(Ordering::Equal)),
                (None, Some(_)) => return Ok(Some(Ordering::Less)),
                (Some(_), None) => return Ok(Some(Ordering::Greater)),
            }
        }
    }
}

impl Clone for Tuple {
    fn clone(&self) -> Self {
        self.iter().cloned().collect()
    }
}

impl Drop for Tuple {
    fn drop(&mut self) {
        let mut link = self.head.take();
        while let Some(mut node) = link {
            link = node.tail.head.take();
        }
    }
}

/// Builds a tuple whose `to_list()` matches the iteration order.
impl FromIterator<Value> for Tuple {
    fn from_iter<I: IntoIterator<Item = Value>>(iter: I) -> Self {
        let elems: Vec<Value> = iter.into_iter().collect();
        let mut tuple = Self::new();
        for elem in elems.into_iter().rev() {
            tuple.push(elem);
        }
        tuple
    }
}

impl fmt::Debug for Tuple {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Tuple")?;
        f.debug_list().entries(self.iter()).finish()
    }
}

impl<'a> IntoIterator for &'a Tuple {
    type Item = &'a Value;
    type IntoIter = Iter<'a>;

    fn into_iter(self) -> Iter<'a> {
        self.iter()
    }
}

pub struct Iter<'a> {
    next: Option<&'a Node>,
}

impl<'a> Iterator for Iter<'a> {
    type Item = &'a Value;

    fn next(&mut self) -> Option<&'a Value> {
        self.next.map(|node| {
            self.next = node.tail.head.as_deref();
            &node.value
        })
    }
}
