//! Math toolset: binary arithmetic and safe expression evaluation.

use async_trait::async_trait;
use serde_json::{json, Value};
use tracing::debug;

use crate::error::ToolError;
use crate::tool::{Tool, ToolArgs, ToolOutput};

/// Render a result, dropping the fractional part when it is zero.
fn format_number(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{:.0}", value)
    } else {
        format!("{}", value)
    }
}

/// The binary operations exposed as individual tools.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArithmeticOp {
    Add,
    Subtract,
    Multiply,
    Divide,
    Power,
    Modulo,
}

impl ArithmeticOp {
    pub const ALL: [ArithmeticOp; 6] = [
        ArithmeticOp::Add,
        ArithmeticOp::Subtract,
        ArithmeticOp::Multiply,
        ArithmeticOp::Divide,
        ArithmeticOp::Power,
        ArithmeticOp::Modulo,
    ];

    pub fn name(self) -> &'static str {
        match self {
            ArithmeticOp::Add => "add",
            ArithmeticOp::Subtract => "subtract",
            ArithmeticOp::Multiply => "multiply",
            ArithmeticOp::Divide => "divide",
            ArithmeticOp::Power => "power",
            ArithmeticOp::Modulo => "modulo",
        }
    }

    fn symbol(self) -> &'static str {
        match self {
            ArithmeticOp::Add => "+",
            ArithmeticOp::Subtract => "-",
            ArithmeticOp::Multiply => "*",
            ArithmeticOp::Divide => "/",
            ArithmeticOp::Power => "^",
            ArithmeticOp::Modulo => "%",
        }
    }

    fn description(self) -> &'static str {
        match self {
            ArithmeticOp::Add => "Add two numbers (a + b).",
            ArithmeticOp::Subtract => "Subtract b from a (a - b).",
            ArithmeticOp::Multiply => "Multiply two numbers (a * b).",
            ArithmeticOp::Divide => "Divide a by b (a / b). Fails when b is zero.",
            ArithmeticOp::Power => "Raise a to the power of b (a ^ b).",
            ArithmeticOp::Modulo => "Remainder of a divided by b (a % b). Fails when b is zero.",
        }
    }

    /// Apply the operation.
    pub fn apply(self, a: f64, b: f64) -> Result<f64, ToolError> {
        match self {
            ArithmeticOp::Add => Ok(a + b),
            ArithmeticOp::Subtract => Ok(a - b),
            ArithmeticOp::Multiply => Ok(a * b),
            ArithmeticOp::Divide if b == 0.0 => {
                Err(ToolError::Math("Cannot divide by zero".to_string()))
            }
            ArithmeticOp::Divide => Ok(a / b),
            ArithmeticOp::Power => Ok(a.powf(b)),
            ArithmeticOp::Modulo if b == 0.0 => Err(ToolError::Math(
                "Cannot take modulo by zero".to_string(),
            )),
            ArithmeticOp::Modulo => Ok(a % b),
        }
    }
}

/// A single binary arithmetic tool.
///
/// # Parameters
///
/// - `a` (required): Left operand
/// - `b` (required): Right operand
pub struct Arithmetic {
    op: ArithmeticOp,
}

impl Arithmetic {
    pub fn new(op: ArithmeticOp) -> Self {
        Self { op }
    }
}

#[async_trait]
impl Tool for Arithmetic {
    fn name(&self) -> &str {
        self.op.name()
    }

    fn description(&self) -> &str {
        self.op.description()
    }

    fn parameters(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "a": {"type": "number", "description": "Left operand"},
                "b": {"type": "number", "description": "Right operand"}
            },
            "required": ["a", "b"]
        })
    }

    async fn execute(&self, args: ToolArgs) -> Result<ToolOutput, ToolError> {
        let a = args.get_number("a")?;
        let b = args.get_number("b")?;
        let result = self.op.apply(a, b)?;

        debug!(op = self.op.name(), a, b, result, "arithmetic");

        Ok(ToolOutput::success(format!(
            "{} {} {} = {}",
            format_number(a),
            self.op.symbol(),
            format_number(b),
            format_number(result)
        )))
    }
}

/// Evaluates arithmetic expressions safely.
///
/// Uses the `meval` crate, which only supports mathematical operations
/// (no code execution, no side effects). `**` is accepted for powers.
///
/// # Parameters
///
/// - `expression` (required): The expression to evaluate.
///
/// # Examples
///
/// ```json
/// {"expression": "(2 + 3) * 4"}
/// {"expression": "2 ** 10 % 7"}
/// ```
pub struct EvaluateExpression;

impl EvaluateExpression {
    pub fn new() -> Self {
        Self
    }
}

impl Default for EvaluateExpression {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Tool for EvaluateExpression {
    fn name(&self) -> &str {
        "evaluate_expression"
    }

    fn description(&self) -> &str {
        "Evaluate a mathematical expression with +, -, *, /, ** or ^ (power), \
         % (modulo) and parentheses, respecting order of operations."
    }

    fn parameters(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "expression": {
                    "type": "string",
                    "description": "Expression to evaluate, e.g. (2 + 3) * 4"
                }
            },
            "required": ["expression"]
        })
    }

    async fn execute(&self, args: ToolArgs) -> Result<ToolOutput, ToolError> {
        let expression = args.get_string("expression")?;
        let normalized = expression.replace("**", "^");

        debug!("Evaluating expression: {}", normalized);

        let result = meval::eval_str(&normalized).map_err(|e| {
            ToolError::Math(format!("Failed to evaluate '{}': {}", expression, e))
        })?;

        if !result.is_finite() {
            return Err(ToolError::Math(format!(
                "'{}' does not evaluate to a finite number",
                expression
            )));
        }

        Ok(ToolOutput::success(format!(
            "{} = {}",
            expression,
            format_number(result)
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn make_args(pairs: &[(&str, Value)]) -> ToolArgs {
        let params: HashMap<String, Value> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect();
        ToolArgs::new(params)
    }

    fn operands(a: f64, b: f64) -> ToolArgs {
        make_args(&[("a", json!(a)), ("b", json!(b))])
    }

    #[tokio::test]
    async fn test_binary_operations() {
        let cases = [
            (ArithmeticOp::Add, 15.0, 27.0, "15 + 27 = 42"),
            (ArithmeticOp::Subtract, 10.0, 3.0, "10 - 3 = 7"),
            (ArithmeticOp::Multiply, 12.0, 4.0, "12 * 4 = 48"),
            (ArithmeticOp::Divide, 100.0, 8.0, "100 / 8 = 12.5"),
            (ArithmeticOp::Power, 2.0, 10.0, "2 ^ 10 = 1024"),
            (ArithmeticOp::Modulo, 10.0, 3.0, "10 % 3 = 1"),
        ];

        for (op, a, b, expected) in cases {
            let result = Arithmetic::new(op).execute(operands(a, b)).await.unwrap();
            assert!(result.success);
            assert_eq!(result.content, expected);
        }
    }

    #[tokio::test]
    async fn test_division_by_zero() {
        let result = Arithmetic::new(ArithmeticOp::Divide)
            .execute(operands(5.0, 0.0))
            .await;
        assert!(matches!(result, Err(ToolError::Math(ref m)) if m.contains("divide by zero")));

        let result = Arithmetic::new(ArithmeticOp::Modulo)
            .execute(operands(5.0, 0.0))
            .await;
        assert!(matches!(result, Err(ToolError::Math(_))));
    }

    #[tokio::test]
    async fn test_missing_operand() {
        let result = Arithmetic::new(ArithmeticOp::Add)
            .execute(make_args(&[("a", json!(1))]))
            .await;
        assert!(matches!(result, Err(ToolError::MissingParameter(ref p)) if p == "b"));
    }

    #[tokio::test]
    async fn test_expression_order_of_operations() {
        let tool = EvaluateExpression::new();

        let result = tool
            .execute(make_args(&[("expression", json!("2 + 3 * 4"))]))
            .await
            .unwrap();
        assert_eq!(result.content, "2 + 3 * 4 = 14");

        let result = tool
            .execute(make_args(&[("expression", json!("(2 + 3) * 4"))]))
            .await
            .unwrap();
        assert_eq!(result.content, "(2 + 3) * 4 = 20");
    }

    #[tokio::test]
    async fn test_expression_double_star_power() {
        let result = EvaluateExpression::new()
            .execute(make_args(&[("expression", json!("2 ** 8"))]))
            .await
            .unwrap();
        assert_eq!(result.content, "2 ** 8 = 256");
    }

    #[tokio::test]
    async fn test_invalid_expression() {
        let tool = EvaluateExpression::new();

        let result = tool
            .execute(make_args(&[("expression", json!("2 +"))]))
            .await;
        assert!(matches!(result, Err(ToolError::Math(_))));

        let result = tool
            .execute(make_args(&[("expression", json!("1 / 0"))]))
            .await;
        assert!(matches!(result, Err(ToolError::Math(_))));
    }
}
