//! Assertions on a single value.

use std::cmp::Ordering;
use std::rc::Rc;

use regex::Regex;

use super::messages;
use crate::value::{self, Value, ValueType};

struct ValueState {
    value: Value,
    description: String,
}

/// Assertion handle on a single column value.
///
/// All assertion methods panic on failure and return the same handle so
/// checks can be chained.
#[derive(Clone)]
pub struct ValueAssert {
    state: Rc<ValueState>,
}

impl ValueAssert {
    pub(crate) fn new(value: Value, description: String) -> Self {
        Self {
            state: Rc::new(ValueState { value, description }),
        }
    }

    /// The actual value under assertion, for custom checks.
    pub fn actual(&self) -> &Value {
        &self.state.value
    }

    /// Whether two handles come from the same memoized navigation.
    pub fn is_same_as(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.state, &other.state)
    }

    // =========================================================================
    // Nullity
    // =========================================================================

    /// Assert the value is null.
    pub fn is_null(&self) -> &Self {
        if self.state.value != Value::Null {
            self.fail(messages::should_be_null(&self.state.value));
        }
        self
    }

    /// Assert the value is not null.
    pub fn is_not_null(&self) -> &Self {
        if self.state.value == Value::Null {
            self.fail(messages::should_be_not_null());
        }
        self
    }

    // =========================================================================
    // Equality
    // =========================================================================

    /// Assert the value equals the expected one.
    ///
    /// The comparison is type-aware: integers and floats compare
    /// numerically, and date, time, datetime and UUID columns accept their
    /// ISO text form as the expected value.
    ///
    /// # Example
    ///
    /// ```rust,ignore
    /// expect(&members).row_at(0).value_named("birthdate").is_equal_to("1960-05-10");
    /// ```
    pub fn is_equal_to(&self, expected: impl Into<Value>) -> &Self {
        let expected = self.coerce(expected.into());
        self.check_comparable(&expected);
        if self.state.value != expected {
            self.fail(messages::should_be_equal(&self.state.value, &expected));
        }
        self
    }

    /// Assert the value differs from the expected one.
    pub fn is_not_equal_to(&self, expected: impl Into<Value>) -> &Self {
        let expected = self.coerce(expected.into());
        self.check_comparable(&expected);
        if self.state.value == expected {
            self.fail(messages::should_not_be_equal(&self.state.value));
        }
        self
    }

    // =========================================================================
    // Chronology
    // =========================================================================

    /// Assert the value is strictly before the expected date, time or
    /// datetime (given as a chrono value or ISO text).
    pub fn is_before(&self, expected: impl Into<Value>) -> &Self {
        self.chronology(expected.into(), &[Ordering::Less], messages::should_be_before)
    }

    /// Assert the value is before or equal to the expected one.
    pub fn is_before_or_equal_to(&self, expected: impl Into<Value>) -> &Self {
        self.chronology(
            expected.into(),
            &[Ordering::Less, Ordering::Equal],
            messages::should_be_before_or_equal,
        )
    }

    /// Assert the value is strictly after the expected one.
    pub fn is_after(&self, expected: impl Into<Value>) -> &Self {
        self.chronology(expected.into(), &[Ordering::Greater], messages::should_be_after)
    }

    /// Assert the value is after or equal to the expected one.
    pub fn is_after_or_equal_to(&self, expected: impl Into<Value>) -> &Self {
        self.chronology(
            expected.into(),
            &[Ordering::Greater, Ordering::Equal],
            messages::should_be_after_or_equal,
        )
    }

    // =========================================================================
    // Numeric comparison
    // =========================================================================

    /// Assert the value is a number strictly greater than the expected one.
    pub fn is_greater_than(&self, expected: impl Into<Value>) -> &Self {
        self.numeric(expected.into(), &[Ordering::Greater], messages::should_be_greater)
    }

    /// Assert the value is a number greater than or equal to the expected one.
    pub fn is_greater_than_or_equal_to(&self, expected: impl Into<Value>) -> &Self {
        self.numeric(
            expected.into(),
            &[Ordering::Greater, Ordering::Equal],
            messages::should_be_greater_or_equal,
        )
    }

    /// Assert the value is a number strictly less than the expected one.
    pub fn is_less_than(&self, expected: impl Into<Value>) -> &Self {
        self.numeric(expected.into(), &[Ordering::Less], messages::should_be_less)
    }

    /// Assert the value is a number less than or equal to the expected one.
    pub fn is_less_than_or_equal_to(&self, expected: impl Into<Value>) -> &Self {
        self.numeric(
            expected.into(),
            &[Ordering::Less, Ordering::Equal],
            messages::should_be_less_or_equal,
        )
    }

    // =========================================================================
    // Type predicates
    // =========================================================================

    /// Assert the value is of the given logical type.
    pub fn is_of_type(&self, expected: ValueType) -> &Self {
        if self.state.value.value_type() != expected {
            self.fail(messages::should_be_value_type(&self.state.value, expected.as_str()));
        }
        self
    }

    /// Assert the value is a boolean.
    pub fn is_boolean(&self) -> &Self {
        self.is_of_type(ValueType::Boolean)
    }

    /// Assert the value is a number.
    pub fn is_number(&self) -> &Self {
        self.is_of_type(ValueType::Number)
    }

    /// Assert the value is a text.
    pub fn is_text(&self) -> &Self {
        self.is_of_type(ValueType::Text)
    }

    /// Assert the value is a date.
    pub fn is_date(&self) -> &Self {
        self.is_of_type(ValueType::Date)
    }

    /// Assert the value is a time of day.
    pub fn is_time(&self) -> &Self {
        self.is_of_type(ValueType::Time)
    }

    /// Assert the value is a datetime.
    pub fn is_date_time(&self) -> &Self {
        self.is_of_type(ValueType::DateTime)
    }

    /// Assert the value is a binary value.
    pub fn is_bytes(&self) -> &Self {
        self.is_of_type(ValueType::Bytes)
    }

    /// Assert the value is a UUID.
    pub fn is_uuid(&self) -> &Self {
        self.is_of_type(ValueType::Uuid)
    }

    // =========================================================================
    // Booleans and text
    // =========================================================================

    /// Assert the value is the boolean `true`.
    pub fn is_true(&self) -> &Self {
        self.is_boolean();
        if self.state.value != Value::Boolean(true) {
            self.fail(messages::should_be_equal(&self.state.value, &Value::Boolean(true)));
        }
        self
    }

    /// Assert the value is the boolean `false`.
    pub fn is_false(&self) -> &Self {
        self.is_boolean();
        if self.state.value != Value::Boolean(false) {
            self.fail(messages::should_be_equal(&self.state.value, &Value::Boolean(false)));
        }
        self
    }

    /// Assert the value is a text matching the regex pattern.
    ///
    /// # Panics
    ///
    /// Panics with a usage error if the pattern is not a valid regex.
    pub fn matches(&self, pattern: &str) -> &Self {
        let Value::Text(text) = &self.state.value else {
            self.fail(messages::should_be_value_type(&self.state.value, "TEXT"));
        };
        let re = Regex::new(pattern)
            .unwrap_or_else(|_| panic!("Pattern <{}> is not a valid regex", pattern));
        if !re.is_match(text) {
            self.fail(messages::should_match(&self.state.value, pattern));
        }
        self
    }

    // =========================================================================
    // Internal helpers
    // =========================================================================

    fn fail(&self, message: String) -> ! {
        super::fail(&self.state.description, &message)
    }

    /// Parse a text expected value into the actual's kind; unparseable text
    /// against a typed column is a usage error.
    fn coerce(&self, expected: Value) -> Value {
        match value::coerce_expected(&self.state.value, expected) {
            Ok(v) => v,
            Err(text) => panic!(
                "Expected <{}> is not correct to compare to a value of type {}",
                text,
                self.state.value.value_type()
            ),
        }
    }

    fn check_comparable(&self, expected: &Value) {
        if !value::comparable_kinds(&self.state.value, expected) {
            self.fail(messages::should_be_value_type(
                &self.state.value,
                expected.value_type().as_str(),
            ));
        }
    }

    fn chronology(
        &self,
        expected: Value,
        accept: &[Ordering],
        message: fn(&Value, &Value) -> String,
    ) -> &Self {
        match self.state.value {
            Value::Date(_) | Value::Time(_) | Value::DateTime(_) => {}
            _ => self.fail(messages::should_be_value_type(
                &self.state.value,
                "[DATE, TIME, DATE_TIME]",
            )),
        }
        let expected = self.coerce(expected);
        match value::chronology_ordering(&self.state.value, &expected) {
            Some(ordering) if accept.contains(&ordering) => self,
            Some(_) => self.fail(message(&self.state.value, &expected)),
            None => panic!(
                "Expected <{}> is not correct to compare to a value of type {}",
                expected,
                self.state.value.value_type()
            ),
        }
    }

    fn numeric(
        &self,
        expected: Value,
        accept: &[Ordering],
        message: fn(&Value, &Value) -> String,
    ) -> &Self {
        if self.state.value.value_type() != ValueType::Number {
            self.fail(messages::should_be_value_type(&self.state.value, "NUMBER"));
        }
        match value::numeric_ordering(&self.state.value, &expected) {
            Some(ordering) if accept.contains(&ordering) => self,
            Some(_) => self.fail(message(&self.state.value, &expected)),
            None => panic!(
                "Expected <{}> is not correct to compare to a value of type {}",
                expected,
                self.state.value.value_type()
            ),
        }
    }
}
