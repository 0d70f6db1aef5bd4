//! The conversation graph and its transition function
//!
//! The graph is built once at startup by [`StateGraph::build`] and never
//! mutated afterwards.

use super::event::Trigger;
use super::parsers::{self, ArgsParser};
use super::render::{self, RenderContext, Renderer};
use super::{NodeName, OutboundMessage, StateError, Update, UserState};
use crate::runtime::TransactionLedger;
use chrono::{DateTime, Utc};
use std::collections::HashMap;

/// Edge to a destination node, with an optional argument parser
#[derive(Clone, Copy)]
pub struct Transition {
    pub dest: NodeName,
    pub parser: Option<ArgsParser>,
}

/// A named state with its renderer and outbound edges
pub struct StateNode {
    name: NodeName,
    renderer: Renderer,
    by_text: Option<Transition>,
    by_command: HashMap<&'static str, Transition>,
    by_callback: HashMap<&'static str, Transition>,
}

impl StateNode {
    fn new(name: NodeName, renderer: Renderer) -> Self {
        Self {
            name,
            renderer,
            by_text: None,
            by_command: HashMap::new(),
            by_callback: HashMap::new(),
        }
    }

    fn on_text(&mut self, dest: NodeName, parser: Option<ArgsParser>) {
        self.by_text = Some(Transition { dest, parser });
    }

    fn on_command(&mut self, command: &'static str, dest: NodeName, parser: Option<ArgsParser>) {
        self.by_command.insert(command, Transition { dest, parser });
    }

    fn on_callback(&mut self, token: &'static str, dest: NodeName, parser: Option<ArgsParser>) {
        self.by_callback.insert(token, Transition { dest, parser });
    }

    /// Commands every interactive node answers to
    fn with_global_commands(mut self) -> Self {
        self.on_command("start", NodeName::Start, None);
        self.on_command("create", NodeName::CreateTransaction, Some(parsers::raw));
        self.on_command("list", NodeName::ListTransactions, Some(parsers::date));
        self
    }

    /// Edge matching `update`, with the argument string for its parser
    fn transition_for<'u>(&self, update: &'u Update) -> Option<(Transition, &'u str)> {
        let (trigger, args) = update.trigger();
        let transition = match trigger {
            Trigger::Text => self.by_text,
            Trigger::Command(name) => self.by_command.get(name).copied(),
            Trigger::Callback(token) => self.by_callback.get(token).copied(),
        }?;
        Some((transition, args))
    }
}

/// Directed graph of conversation nodes
pub struct StateGraph {
    nodes: HashMap<NodeName, StateNode>,
}

impl StateGraph {
    /// Build the fixed conversation graph
    pub fn build() -> Self {
        let start = StateNode::new(NodeName::Start, render::start).with_global_commands();

        let mut create = StateNode::new(NodeName::CreateTransaction, render::create_transaction)
            .with_global_commands();
        create.on_text(NodeName::CreateTransaction, Some(parsers::raw));

        let mut list = StateNode::new(NodeName::ListTransactions, render::list_transactions)
            .with_global_commands();
        list.on_callback("list", NodeName::ListTransactions, Some(parsers::date));
        list.on_callback("show", NodeName::ShowTransaction, Some(parsers::transaction_id));

        let mut show = StateNode::new(NodeName::ShowTransaction, render::show_transaction)
            .with_global_commands();
        show.on_callback("list", NodeName::ListTransactions, Some(parsers::date));

        let nodes = [start, create, list, show]
            .into_iter()
            .map(|node| (node.name, node))
            .collect();
        Self { nodes }
    }

    /// Compute the state after `update`.
    ///
    /// On any error `state` is left as it was: a parse failure aborts the
    /// transition before the destination name is committed.
    pub fn advance(
        &self,
        state: &UserState,
        update: &Update,
        now: DateTime<Utc>,
    ) -> Result<UserState, StateError> {
        let node = self
            .nodes
            .get(&state.node())
            .ok_or(StateError::NoTransition)?;
        let (transition, args) = node
            .transition_for(update)
            .ok_or(StateError::NoTransition)?;

        let mut next = state.clone();
        next.clear_pending();
        if let Some(parser) = transition.parser {
            next = parser(next, args, now)?;
        }
        next.name = Some(transition.dest);

        Ok(next)
    }

    /// Reply for a transition into `state`'s node
    pub fn render(
        &self,
        state: &UserState,
        ledger: &dyn TransactionLedger,
        now: DateTime<Utc>,
    ) -> Result<OutboundMessage, StateError> {
        let node = self
            .nodes
            .get(&state.node())
            .ok_or(StateError::NoTransition)?;
        let ctx = RenderContext { ledger, now };
        (node.renderer)(state, &ctx)
    }

    /// Whether `name` is a node of this graph
    #[allow(dead_code)] // Used in tests
    pub fn contains(&self, name: NodeName) -> bool {
        self.nodes.contains_key(&name)
    }
}
