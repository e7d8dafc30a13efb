//! Built-in demo tools.

use troupe_agent::{AgentError, ArgType, FnTool, Result, ToolRegistry, ToolResult};

/// `sum_two_elements`, `multiply_two_elements` and `word_count`.
pub fn tools() -> Result<ToolRegistry> {
    let mut registry = ToolRegistry::new();

    registry.register(
        FnTool::builder("sum_two_elements")
            .description("Sum two integers and return the result")
            .param("a", ArgType::Int)
            .param("b", ArgType::Int)
            .handler(|args| {
                let sum = args
                    .int("a")?
                    .checked_add(args.int("b")?)
                    .ok_or_else(|| AgentError::tool("sum overflows i64"))?;
                Ok(ToolResult::from(sum))
            })
            .build()?,
    )?;

    registry.register(
        FnTool::builder("multiply_two_elements")
            .description("Multiply two numbers and return the result")
            .param("a", ArgType::Float)
            .param("b", ArgType::Float)
            .handler(|args| {
                let product = args.float("a")? * args.float("b")?;
                if !product.is_finite() {
                    return Err(AgentError::tool("product is not a finite number"));
                }
                Ok(ToolResult::from(product))
            })
            .build()?,
    )?;

    registry.register(
        FnTool::builder("word_count")
            .description("Count the words in a text")
            .param("text", ArgType::Str)
            .handler(|args| {
                let count = args.str("text")?.split_whitespace().count();
                Ok(ToolResult::from(count as i64))
            })
            .build()?,
    )?;

    Ok(registry)
}

#[cfg(test)]
mod tests {
    use troupe_agent::RawToolCall;

    use super::*;

    #[tokio::test]
    async fn test_builtin_dispatch() {
        let tools = tools().unwrap();
        assert_eq!(
            tools.names(),
            vec!["sum_two_elements", "multiply_two_elements", "word_count"]
        );

        let (_, sum) = tools
            .dispatch(&RawToolCall::new("sum_two_elements").with_arg("a", "2").with_arg("b", 3))
            .await
            .unwrap();
        assert_eq!(sum.to_value(), serde_json::json!(5));

        let (_, words) = tools
            .dispatch(&RawToolCall::new("word_count").with_arg("text", "one two  three"))
            .await
            .unwrap();
        assert_eq!(words.to_value(), serde_json::json!(3));
    }

    #[tokio::test]
    async fn test_sum_overflow_is_tool_error() {
        let tools = tools().unwrap();
        let err = tools
            .dispatch(
                &RawToolCall::new("sum_two_elements")
                    .with_arg("a", i64::MAX)
                    .with_arg("b", 1),
            )
            .await
            .unwrap_err();
        assert!(matches!(err, AgentError::Tool(ref msg) if msg.contains("overflows")));
    }

    #[tokio::test]
    async fn test_infinite_product_is_tool_error() {
        let tools = tools().unwrap();
        let err = tools
            .dispatch(
                &RawToolCall::new("multiply_two_elements")
                    .with_arg("a", 1e200)
                    .with_arg("b", 1e200),
            )
            .await
            .unwrap_err();
        assert!(matches!(err, AgentError::Tool(_)));
    }
}
