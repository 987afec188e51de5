//! Cycle placeholders.
//!
//! A container node starts its output with the right shape (empty object,
//! copied array) and defers filling it. If the same (node, value) pair is
//! reached again while filling, the caller gets this same placeholder back
//! and aliases it, which is how cyclic input produces cyclic output.
use std::cell::{Cell, RefCell};
use std::rc::Rc;

use crate::eval::Visit;
use crate::eval::guard;
use crate::result::{Failure, Validation};
use crate::runtype::Runtype;
use crate::types::parsed::Transform;
use crate::value::{Array, Object, Value};

/// Either a finished result or a placeholder still to be unwrapped.
pub(crate) enum Step {
    Done(Validation),
    Cycle(Rc<Cycle>),
}

type Fill = Box<dyn FnOnce(&dyn Visit) -> Option<Failure>>;

enum Source {
    /// Populates the placeholder in place; `Some` is the first failure.
    Fill(Fill),
    /// Finishes another placeholder, then transforms its value.
    Mapped { source: Rc<Cycle>, transform: Transform, guard: Option<Runtype> },
}

pub(crate) struct Cycle {
    placeholder: RefCell<Value>,
    source: RefCell<Option<Source>>,
    cache: RefCell<Option<Validation>>,
    reentered: Cell<bool>,
}

impl Step {
    pub(crate) fn resolve(self, cx: &dyn Visit) -> Validation {
        match self {
            Step::Done(result) => result,
            Step::Cycle(cycle) => cycle.unwrap(cx),
        }
    }
}

impl Cycle {
    fn start(placeholder: Value, source: Source) -> Step {
        Step::Cycle(Rc::new(Cycle {
            placeholder: RefCell::new(placeholder),
            source: RefCell::new(Some(source)),
            cache: RefCell::new(None),
            reentered: Cell::new(false),
        }))
    }

    /// Placeholder for an object built key by key.
    pub(crate) fn object(fill: impl FnOnce(&dyn Visit, &Object) -> Option<Failure> + 'static) -> Step {
        let target = Object::new();
        let placeholder = Value::Object(target.clone());
        Self::start(placeholder, Source::Fill(Box::new(move |cx| fill(cx, &target))))
    }

    /// Placeholder for an array that starts as a copy of `items`.
    pub(crate) fn array(
        items: Vec<Value>,
        fill: impl FnOnce(&dyn Visit, &Array) -> Option<Failure> + 'static,
    ) -> Step {
        let target = Array::new(items);
        let placeholder = Value::Array(target.clone());
        Self::start(placeholder, Source::Fill(Box::new(move |cx| fill(cx, &target))))
    }

    pub(crate) fn placeholder(&self) -> Value {
        self.placeholder.borrow().clone()
    }

    /// Finishes the placeholder once; re-entrant calls get the in-progress value.
    pub(crate) fn unwrap(&self, cx: &dyn Visit) -> Validation {
        let cached = self.cache.borrow().clone();
        if let Some(cached) = cached {
            self.reentered.set(true);
            return cached;
        }
        let start = self.placeholder();
        *self.cache.borrow_mut() = Some(Ok(start.clone()));

        let Some(source) = self.source.borrow_mut().take() else {
            return Ok(start);
        };
        let (result, extra_guard) = match source {
            Source::Fill(fill) => match fill(cx) {
                Some(failure) => (Err(failure), None),
                None => (Ok(start.clone()), None),
            },
            Source::Mapped { source, transform, guard } => {
                (source.unwrap(cx).and_then(|value| transform(&value)), guard)
            }
        };
        let finished = result
            .and_then(|value| {
                if self.reentered.get() { attempt_mixin(&start, value) } else { Ok(value) }
            })
            .and_then(|value| match &extra_guard {
                Some(test) => guard::guard(test, &value, &None, true).map(|()| value),
                None => Ok(value),
            });

        if let Ok(value) = &finished {
            *self.placeholder.borrow_mut() = value.clone();
        }
        *self.cache.borrow_mut() = Some(finished.clone());
        finished
    }
}

/// Applies `transform` to a child's outcome. A finished result is mapped now;
/// a placeholder gets a new placeholder (a shallow copy) that maps on unwrap.
/// When `guard` is given, the transformed value must also pass it.
pub(crate) fn map_placeholder(step: Step, transform: Transform, guard: Option<Runtype>) -> Step {
    match step {
        Step::Done(Err(failure)) => Step::Done(Err(failure)),
        Step::Done(Ok(value)) => {
            let result = transform(&value).and_then(|mapped| match &guard {
                Some(test) => guard::guard(test, &mapped, &None, true).map(|()| mapped),
                None => Ok(mapped),
            });
            Step::Done(result)
        }
        Step::Cycle(source) => {
            let placeholder = source.placeholder().shallow_copy();
            Cycle::start(placeholder, Source::Mapped { source, transform, guard })
        }
    }
}

/// Reconciles the aliased placeholder with the value the transform produced.
fn attempt_mixin(placeholder: &Value, value: Value) -> Validation {
    if placeholder.strict_equals(&value) {
        return Ok(value);
    }
    match (placeholder, &value) {
        (Value::Array(target), Value::Array(items)) => {
            target.replace(items.snapshot());
            Ok(placeholder.clone())
        }
        (Value::Object(target), Value::Object(source)) => {
            target.assign(source);
            Ok(placeholder.clone())
        }
        _ => Err(Failure::new(format!(
            "Cannot convert a value of type \"{}\" into a value of type \"{}\" when it contains cycles.",
            container_name(placeholder),
            container_name(&value),
        ))),
    }
}

fn container_name(value: &Value) -> &'static str {
    match value {
        Value::Array(_) => "Array",
        Value::Null => "null",
        other => other.type_of(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::eval::Evaluator;
    use crate::runtype::Mode;

    #[test]
    fn unwrap_is_memoized() {
        let cx = Evaluator::new(Mode::Parse);
        let calls = Rc::new(Cell::new(0));
        let counter = calls.clone();
        let Step::Cycle(cycle) = Cycle::object(move |_, target| {
            counter.set(counter.get() + 1);
            target.insert("a", Value::Bool(true));
            None
        }) else {
            panic!("expected a placeholder");
        };
        let first = cycle.unwrap(&cx).unwrap();
        let second = cycle.unwrap(&cx).unwrap();
        assert_eq!(calls.get(), 1);
        assert!(first.strict_equals(&second));
    }

    #[test]
    fn mixin_refuses_to_change_container_kind() {
        let failure = attempt_mixin(&Value::array([]), Value::Null).unwrap_err();
        assert_eq!(
            failure.message,
            "Cannot convert a value of type \"Array\" into a value of type \"null\" when it contains cycles."
        );
        let target = Value::object([("a", Value::Bool(true))]);
        let merged = attempt_mixin(&target, Value::object([("b", Value::Null)])).unwrap();
        assert!(merged.strict_equals(&target));
        assert!(target.has_own("a") && target.has_own("b"));
    }
}
