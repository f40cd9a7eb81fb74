use super::{ActionDirective, EventKind, ExecutionContext, InboundEvent, TurnOutcome, TurnReport};
use crate::collab::VariableStore;
use crate::error::{ExecutionError, ValidationIssue};
use crate::graph::{ConnectionGraph, ConnectionType};
use crate::message::{MessageTree, compose, substitute};
use crate::predicate::Predicate;
use crate::registry::{ActionOp, BlockFields, TriggerPattern};
use crate::value::Value;
use ahash::AHashMap;
use tracing::{debug, warn};

/// What one visited block decided.
enum Step {
    Goto(String),
    Finish,
    Reply(MessageTree),
    Fail(ExecutionError),
}

/// Walks a validated connection graph for one inbound event at a time.
///
/// The engine itself is immutable and shareable; every run gets its own
/// [`ExecutionContext`], so concurrent runs for different events are
/// independent by construction.
#[derive(Debug)]
pub struct Engine {
    graph: ConnectionGraph,
    templates: AHashMap<String, MessageTree>,
}

impl Engine {
    /// Admits a graph for execution.
    ///
    /// Refuses any graph with outstanding authoring issues; execution never
    /// starts on a graph `validate_all` rejects.
    pub fn new(
        graph: ConnectionGraph,
        templates: AHashMap<String, MessageTree>,
    ) -> Result<Self, Vec<ValidationIssue>> {
        let issues = graph.validate_all();
        if issues.is_empty() {
            Ok(Engine { graph, templates })
        } else {
            Err(issues)
        }
    }

    pub fn graph(&self) -> &ConnectionGraph {
        &self.graph
    }

    /// Runs one turn: locate a trigger, walk, compose.
    ///
    /// Never panics and never returns an opaque error; every failure mode is
    /// a [`TurnOutcome`] variant carrying the failing block id.
    pub fn run(
        &self,
        event: &InboundEvent,
        mut ctx: ExecutionContext,
        store: &mut dyn VariableStore,
    ) -> TurnReport {
        let Some(trigger_id) = self.locate_trigger(event) else {
            debug!(user = %event.user_id, "no trigger matched, ignoring event");
            return TurnReport {
                context: ctx,
                outcome: TurnOutcome::NoTrigger,
            };
        };

        let mut directives: Vec<ActionDirective> = Vec::new();
        let mut current = trigger_id;

        loop {
            ctx.current_step += 1;
            if ctx.current_step > ctx.max_execution_steps {
                // The budget is exhausted; routing this through an ERROR
                // edge would re-trip it on the handler's first block.
                let max_steps = ctx.max_execution_steps;
                return TurnReport {
                    context: ctx,
                    outcome: TurnOutcome::Failed {
                        block_id: current,
                        error: ExecutionError::StepBudgetExceeded { max_steps },
                    },
                };
            }
            ctx.execution_stack.push(current.clone());

            let Some(block) = self.graph.block(&current) else {
                return TurnReport {
                    context: ctx,
                    outcome: TurnOutcome::Failed {
                        block_id: current.clone(),
                        error: ExecutionError::MissingBlock(current),
                    },
                };
            };
            debug!(block = %current, kind = %block.kind(), step = ctx.current_step, "visiting block");

            let step = match &block.fields {
                BlockFields::MessageTrigger { .. } => self.follow_next(&current),
                BlockFields::Condition {} => self.branch(&current, &ctx),
                BlockFields::Loop {
                    iterations,
                    condition,
                } => self.advance_loop(&current, *iterations, condition.as_ref(), &mut ctx),
                BlockFields::Action { op } => {
                    self.act(&current, op, event, &mut ctx, &mut directives, store)
                }
                _ => Step::Fail(ExecutionError::NotExecutable(block.kind())),
            };

            match step {
                Step::Goto(next) => current = next,
                Step::Finish => {
                    return TurnReport {
                        context: ctx,
                        outcome: TurnOutcome::Actions(directives),
                    };
                }
                Step::Reply(message) => {
                    return TurnReport {
                        context: ctx,
                        outcome: TurnOutcome::Reply {
                            message,
                            directives,
                        },
                    };
                }
                Step::Fail(error) => {
                    match self.graph.walkable(&current, ConnectionType::Error).first() {
                        Some(edge) => {
                            warn!(block = %current, %error, "recovering via ERROR edge");
                            current = edge.target.clone();
                        }
                        None => {
                            return TurnReport {
                                context: ctx,
                                outcome: TurnOutcome::Failed {
                                    block_id: current,
                                    error,
                                },
                            };
                        }
                    }
                }
            }
        }
    }

    /// First trigger block, in declaration order, with a matching pattern.
    /// Declaration order makes the tie-break auditable by the author.
    fn locate_trigger(&self, event: &InboundEvent) -> Option<String> {
        self.graph.blocks().iter().find_map(|block| match &block.fields {
            BlockFields::MessageTrigger { patterns }
                if patterns.iter().any(|p| pattern_matches(p, event)) =>
            {
                Some(block.id.clone())
            }
            _ => None,
        })
    }

    fn follow_next(&self, block_id: &str) -> Step {
        match self.graph.walkable(block_id, ConnectionType::Next).first() {
            Some(edge) => Step::Goto(edge.target.clone()),
            None => Step::Finish,
        }
    }

    /// CONDITION edges in `order`; first true predicate wins, else the
    /// fallback NEXT edge, else NoBranchMatched.
    fn branch(&self, block_id: &str, ctx: &ExecutionContext) -> Step {
        let matched = self
            .graph
            .walkable(block_id, ConnectionType::Condition)
            .into_iter()
            .find(|edge| {
                edge.condition
                    .as_ref()
                    .is_some_and(|pred| pred.evaluate(&ctx.variables))
            });
        match matched {
            Some(edge) => Step::Goto(edge.target.clone()),
            None => match self.graph.walkable(block_id, ConnectionType::Next).first() {
                Some(edge) => Step::Goto(edge.target.clone()),
                None => Step::Fail(ExecutionError::NoBranchMatched),
            },
        }
    }

    /// Takes the LOOP edge while the counter is nonzero and the optional
    /// continuation predicate holds; otherwise exits via NEXT.
    ///
    /// `iterations == 0` means the loop is purely condition-driven; the
    /// step budget remains the backstop.
    fn advance_loop(
        &self,
        block_id: &str,
        iterations: u32,
        condition: Option<&Predicate>,
        ctx: &mut ExecutionContext,
    ) -> Step {
        let remaining = *ctx
            .loop_counters
            .entry(block_id.to_string())
            .or_insert(iterations);
        let count_ok = iterations == 0 || remaining > 0;
        let cond_ok = condition.is_none_or(|pred| pred.evaluate(&ctx.variables));

        if count_ok && cond_ok {
            if iterations > 0 {
                ctx.loop_counters.insert(block_id.to_string(), remaining - 1);
            }
            match self.graph.walkable(block_id, ConnectionType::Loop).first() {
                Some(edge) => Step::Goto(edge.target.clone()),
                // LOOP out-degree is validated to exactly one at admission.
                None => Step::Fail(ExecutionError::MissingBlock(block_id.to_string())),
            }
        } else {
            self.follow_next(block_id)
        }
    }

    fn act(
        &self,
        block_id: &str,
        op: &ActionOp,
        event: &InboundEvent,
        ctx: &mut ExecutionContext,
        directives: &mut Vec<ActionDirective>,
        store: &mut dyn VariableStore,
    ) -> Step {
        match op {
            ActionOp::SetVariable {
                key,
                value,
                durable,
            } => {
                let rendered = Value::Text(substitute(value, &ctx.variables));
                ctx.variables.insert(key.clone(), rendered.clone());
                if *durable {
                    if let Err(err) = store.set(&event.user_id, key, rendered.clone()) {
                        return Step::Fail(err.into());
                    }
                }
                directives.push(ActionDirective::SetVariable {
                    key: key.clone(),
                    value: rendered,
                    durable: *durable,
                });
                self.follow_next(block_id)
            }
            ActionOp::LoadVariable { key } => {
                match store.get(&event.user_id, key) {
                    Ok(Some(value)) => {
                        ctx.variables.insert(key.clone(), value);
                    }
                    // A key the store has never seen leaves the variable
                    // unset, so IsSet predicates can branch on it.
                    Ok(None) => {}
                    Err(err) => return Step::Fail(err.into()),
                }
                self.follow_next(block_id)
            }
            ActionOp::SendMessage { template_id } => {
                let Some(template) = self.templates.get(template_id) else {
                    return Step::Fail(ExecutionError::MissingTemplate(template_id.clone()));
                };
                match compose(template, &ctx.variables) {
                    Ok(message) => Step::Reply(message),
                    Err(err) => Step::Fail(err.into()),
                }
            }
        }
    }
}

fn pattern_matches(pattern: &TriggerPattern, event: &InboundEvent) -> bool {
    match (pattern, event.kind) {
        (TriggerPattern::Keyword { text, exact }, EventKind::Message) => {
            if *exact {
                event.payload == *text
            } else {
                event.payload.contains(text.as_str())
            }
        }
        (TriggerPattern::Postback { data }, EventKind::Postback) => event.payload == *data,
        (TriggerPattern::Follow, EventKind::Follow) => true,
        (TriggerPattern::Unfollow, EventKind::Unfollow) => true,
        _ => false,
    }
}
