//! The delegate stack: routes each parse event to exactly one active
//! handler.
//!
//! Element parsers are pushed when their opening tag appears and popped when
//! their subtree closes. The stack owns every delegate and hands a popped
//! delegate's outcome to its parent, so parsers never hold references to
//! each other and dropping the stack mid-parse simply aborts with no
//! completion delivered.

use crate::error::AclError;
use crate::events::XmlEvent;
use crate::extension::ExtensionElement;
use crate::model::{Ace, Acl};

/// What a delegate asks the stack to do after handling one event.
pub enum Control {
    /// Keep routing events to this delegate.
    Continue,
    /// Push a child delegate for the element that just opened. The
    /// triggering event is redelivered to the child, so the first event a
    /// delegate sees is always its own opening tag.
    Delegate(Box<dyn ElementDelegate>),
    /// The delegate's element closed. Pop it and deliver the outcome to the
    /// parent, or surface it as the stack's result if this was the root.
    Complete(Outcome),
}

/// The finished product a delegate hands back when it pops.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    Acl(Acl),
    Ace(Ace),
    /// The ACE subtree was fully consumed but did not yield a valid entry.
    /// The parent decides whether that is fatal.
    InvalidAce(String),
    Extension(ExtensionElement),
}

/// An element parser that owns one subtree of the document.
///
/// While a delegate is active it receives every event inside its subtree and
/// nothing else. It must complete on the closing tag of the element it was
/// pushed for.
pub trait ElementDelegate {
    fn handle_event(&mut self, event: &XmlEvent) -> Result<Control, AclError>;

    /// Called when a child this delegate pushed has completed. The child has
    /// already been popped; the next event goes to `self` again.
    fn child_completed(&mut self, outcome: Outcome) -> Result<(), AclError>;
}

/// LIFO chain of active delegates. The bottom entry is the root parser; its
/// outcome becomes the result of the whole parse.
pub struct DelegateStack {
    active: Vec<Box<dyn ElementDelegate>>,
    outcome: Option<Outcome>,
}

impl DelegateStack {
    pub fn new(root: Box<dyn ElementDelegate>) -> Self {
        DelegateStack {
            active: vec![root],
            outcome: None,
        }
    }

    pub fn depth(&self) -> usize {
        self.active.len()
    }

    /// True once the root delegate has completed. Dispatching past this
    /// point is a caller bug and fails with `AclError::State`.
    pub fn is_complete(&self) -> bool {
        self.outcome.is_some()
    }

    pub fn take_outcome(&mut self) -> Option<Outcome> {
        self.outcome.take()
    }

    /// Routes one event to the innermost active delegate.
    ///
    /// A `Delegate` answer loops so the new child handles the same event; a
    /// `Complete` answer pops and notifies the parent. Any error unwinds the
    /// whole parse.
    pub fn dispatch(&mut self, event: &XmlEvent) -> Result<(), AclError> {
        loop {
            let top = self.active.last_mut().ok_or_else(|| {
                AclError::State("event dispatched after the root delegate completed".to_string())
            })?;
            match top.handle_event(event)? {
                Control::Continue => return Ok(()),
                Control::Delegate(child) => {
                    self.active.push(child);
                }
                Control::Complete(outcome) => {
                    self.active.pop();
                    match self.active.last_mut() {
                        Some(parent) => return parent.child_completed(outcome),
                        None => {
                            self.outcome = Some(outcome);
                            return Ok(());
                        }
                    }
                }
            }
        }
    }
}
