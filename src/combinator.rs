//! Parser combinators.
//!
//! The framework is shared by the byte-level lexers and the token-to-value
//! parser: anything implementing [`Parser`] over a [`Checkpoint`] input can
//! be combined with [`Or`], [`Seq`] and [`Cycle`]. The one discipline every
//! parser must follow is that failure leaves the input exactly where it was
//! on entry, so alternatives can be retried at the same point.
//!
//! Auxiliary information about a parse (which alternative won, why the
//! others did not, where a repetition stopped) is threaded through the
//! return types rather than kept as instance state, so combinator values
//! are re-entrant and freely shareable.

use std::convert::Infallible;

/// Input state that can be captured and restored.
///
/// Combinators that consume across several child parsers snapshot the input
/// up front and roll back on failure.
pub trait Checkpoint {
    /// Snapshot of the input state.
    type Mark: Copy;

    /// Capture the current state.
    fn mark(&self) -> Self::Mark;

    /// Return to a previously captured state.
    fn restore(&mut self, mark: Self::Mark);
}

/// A parser over input `C`.
///
/// Contract: when `parse` returns `Err`, the input is at the position it
/// held when `parse` was called.
pub trait Parser<C> {
    /// Value produced on success.
    type Output;

    /// Error produced on failure.
    type Error;

    /// Run the parser, consuming input only on success.
    fn parse(&mut self, input: &mut C) -> Result<Self::Output, Self::Error>;
}

/// Parser that consumes nothing and always succeeds.
///
/// The default separator of [`Cycle`].
#[derive(Debug, Clone, Copy, Default)]
pub struct Nothing;

impl<C> Parser<C> for Nothing {
    type Output = ();
    type Error = Infallible;

    fn parse(&mut self, _input: &mut C) -> Result<(), Infallible> {
        Ok(())
    }
}

/// First-match alternation over a tuple of parsers.
///
/// Branches are tried left to right and the first success wins. The success
/// value carries the winning branch index and the errors of the branches
/// tried before it, so a caller can still see why earlier alternatives did
/// not match. On total failure every branch error is returned, in
/// declaration order. `Or` itself never moves the input: a failing branch
/// has already restored it, and the winning branch's consumption stands.
#[derive(Debug, Clone)]
pub struct Or<P> {
    parsers: P,
}

impl<P> Or<P> {
    /// Alternation over a tuple of parsers sharing output and error types.
    pub fn new(parsers: P) -> Self {
        Or { parsers }
    }
}

/// Sequential composition over a tuple of parsers.
///
/// Outputs are collected into a tuple. On failure the input is restored to
/// the sequence's entry position and a [`SeqError`] reports which element
/// failed; the index doubles as the number of elements that had already
/// succeeded.
#[derive(Debug, Clone)]
pub struct Seq<P> {
    parsers: P,
}

impl<P> Seq<P> {
    /// Sequence over a tuple of parsers sharing an error type.
    pub fn new(parsers: P) -> Self {
        Seq { parsers }
    }
}

/// Error of a [`Seq`].
#[derive(Debug, Clone, PartialEq)]
pub struct SeqError<E> {
    /// Index of the failing element.
    pub index: usize,
    /// That element's error.
    pub error: E,
}

macro_rules! impl_or {
    ($len:expr => $($P:ident $idx:tt),+) => {
        impl<C, Out, Err, $($P),+> Parser<C> for Or<($($P,)+)>
        where
            $($P: Parser<C, Output = Out, Error = Err>,)+
        {
            type Output = (usize, Out, Vec<Err>);
            type Error = Vec<Err>;

            fn parse(&mut self, input: &mut C) -> Result<Self::Output, Self::Error> {
                let mut errors = Vec::with_capacity($len);
                $(
                    match self.parsers.$idx.parse(input) {
                        Ok(value) => return Ok(($idx, value, errors)),
                        Err(error) => errors.push(error),
                    }
                )+
                Err(errors)
            }
        }
    };
}

impl_or!(2 => P0 0, P1 1);
impl_or!(3 => P0 0, P1 1, P2 2);
impl_or!(4 => P0 0, P1 1, P2 2, P3 3);
impl_or!(5 => P0 0, P1 1, P2 2, P3 3, P4 4);
impl_or!(6 => P0 0, P1 1, P2 2, P3 3, P4 4, P5 5);

macro_rules! impl_seq {
    ($($P:ident $O:ident $value:ident $idx:tt),+) => {
        impl<C, Err, $($P, $O),+> Parser<C> for Seq<($($P,)+)>
        where
            C: Checkpoint,
            $($P: Parser<C, Output = $O, Error = Err>,)+
        {
            type Output = ($($O,)+);
            type Error = SeqError<Err>;

            fn parse(&mut self, input: &mut C) -> Result<Self::Output, Self::Error> {
                let entry = input.mark();
                $(
                    let $value = match self.parsers.$idx.parse(input) {
                        Ok(value) => value,
                        Err(error) => {
                            input.restore(entry);
                            return Err(SeqError { index: $idx, error });
                        }
                    };
                )+
                Ok(($($value,)+))
            }
        }
    };
}

impl_seq!(P0 O0 v0 0, P1 O1 v1 1);
impl_seq!(P0 O0 v0 0, P1 O1 v1 1, P2 O2 v2 2);
impl_seq!(P0 O0 v0 0, P1 O1 v1 1, P2 O2 v2 2, P3 O3 v3 3);
impl_seq!(P0 O0 v0 0, P1 O1 v1 1, P2 O2 v2 2, P3 O3 v3 3, P4 O4 v4 4);
impl_seq!(P0 O0 v0 0, P1 O1 v1 1, P2 O2 v2 2, P3 O3 v3 3, P4 O4 v4 4, P5 O5 v5 5);

/// Greedy repetition of `main`, interleaved with `separator`.
///
/// Never fails. Repetition ends the first time either child parser does;
/// the values parsed so far are returned together with a [`CycleStop`]
/// describing the cause. The input is left at the start of the failing
/// element: a consumed separator before a failed element stays consumed.
#[derive(Debug, Clone)]
pub struct Cycle<M, S = Nothing> {
    main: M,
    separator: S,
}

impl<M> Cycle<M, Nothing> {
    /// Repetition without separators.
    pub fn new(main: M) -> Self {
        Cycle { main, separator: Nothing }
    }
}

impl<M, S> Cycle<M, S> {
    /// Repetition of `main` interleaved with `separator`.
    pub fn with_separator(main: M, separator: S) -> Self {
        Cycle { main, separator }
    }

    /// Run the repetition; unlike [`Parser::parse`] the infallibility is
    /// visible in the signature.
    pub fn run<C>(&mut self, input: &mut C) -> (Vec<M::Output>, CycleStop<M::Error, S::Error>)
    where
        C: Checkpoint,
        M: Parser<C>,
        S: Parser<C>,
    {
        match self.parse(input) {
            Ok(output) => output,
            Err(never) => match never {},
        }
    }
}

/// Why a [`Cycle`] stopped.
#[derive(Debug, Clone, PartialEq)]
pub enum CycleStop<ME, SE> {
    /// `main` failed, either on the very first element (`at_start`) or on
    /// the element following a successful separator.
    Element {
        /// True when no element had been parsed yet.
        at_start: bool,
        /// The element parser's error.
        error: ME,
    },
    /// `separator` failed after at least one element.
    Separator {
        /// The separator parser's error.
        error: SE,
    },
}

impl<C, M, S> Parser<C> for Cycle<M, S>
where
    C: Checkpoint,
    M: Parser<C>,
    S: Parser<C>,
{
    type Output = (Vec<M::Output>, CycleStop<M::Error, S::Error>);
    type Error = Infallible;

    fn parse(&mut self, input: &mut C) -> Result<Self::Output, Infallible> {
        let mut values = Vec::new();
        match self.main.parse(input) {
            Ok(value) => values.push(value),
            Err(error) => return Ok((values, CycleStop::Element { at_start: true, error })),
        }
        loop {
            let before_separator = input.mark();
            if let Err(error) = self.separator.parse(input) {
                input.restore(before_separator);
                return Ok((values, CycleStop::Separator { error }));
            }
            let before_element = input.mark();
            match self.main.parse(input) {
                Ok(value) => values.push(value),
                Err(error) => {
                    input.restore(before_element);
                    return Ok((values, CycleStop::Element { at_start: false, error }));
                }
            }
        }
    }
}
