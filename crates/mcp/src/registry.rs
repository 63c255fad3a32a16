//! Explicit tool registry.
//!
//! Tools are registered by name with a typed parameter struct. The input
//! schema is generated once, at registration, from the parameter type.

use std::collections::BTreeMap;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use schemars::JsonSchema;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

use crate::error::{Error, Result};
use crate::protocol::{CallToolResult, Tool};

type BoxFuture<T> = Pin<Box<dyn Future<Output = T> + Send>>;
type Handler = Arc<dyn Fn(Value) -> BoxFuture<Result<CallToolResult>> + Send + Sync>;

struct RegisteredTool {
    tool: Tool,
    handler: Handler,
}

/// Maps tool names to their declaration and handler.
#[derive(Default)]
pub struct ToolRegistry {
    tools: BTreeMap<String, RegisteredTool>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a tool taking arguments of type `P`.
    ///
    /// Arguments that do not decode into `P` are rejected before the handler
    /// runs.
    pub fn register<P, F, Fut>(
        &mut self,
        name: &str,
        description: &str,
        handler: F,
    ) -> Result<&mut Self>
    where
        P: JsonSchema + DeserializeOwned + Send + 'static,
        F: Fn(P) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = CallToolResult> + Send + 'static,
    {
        if self.tools.contains_key(name) {
            return Err(Error::DuplicateTool(name.to_string()));
        }

        let tool = Tool {
            name: name.to_string(),
            description: Some(description.to_string()),
            input_schema: input_schema::<P>()?,
        };

        let tool_name = name.to_string();
        let dispatch: Handler = Arc::new(move |arguments: Value| -> BoxFuture<Result<CallToolResult>> {
            let params = match serde_json::from_value::<P>(arguments) {
                Ok(params) => params,
                Err(e) => {
                    let err = Error::InvalidParams {
                        tool: tool_name.clone(),
                        message: e.to_string(),
                    };
                    return Box::pin(async move { Err(err) });
                }
            };
            let fut = handler(params);
            Box::pin(async move { Ok(fut.await) })
        });

        self.tools.insert(
            name.to_string(),
            RegisteredTool {
                tool,
                handler: dispatch,
            },
        );
        Ok(self)
    }

    /// Declarations of all registered tools, ordered by name.
    pub fn tools(&self) -> Vec<Tool> {
        self.tools.values().map(|t| t.tool.clone()).collect()
    }

    /// Get a tool declaration by name.
    pub fn get(&self, name: &str) -> Option<&Tool> {
        self.tools.get(name).map(|t| &t.tool)
    }

    /// Call a tool by name. Missing arguments are treated as `{}`.
    pub async fn call(&self, name: &str, arguments: Option<Value>) -> Result<CallToolResult> {
        let registered = self
            .tools
            .get(name)
            .ok_or_else(|| Error::ToolNotFound(name.to_string()))?;

        let arguments = match arguments {
            None | Some(Value::Null) => Value::Object(Map::new()),
            Some(args) => args,
        };

        (registered.handler)(arguments).await
    }
}

/// JSON schema for a parameter type, without the `$schema` meta key.
fn input_schema<P: JsonSchema>() -> Result<Value> {
    let mut schema = serde_json::to_value(schemars::schema_for!(P))?;
    if let Some(obj) = schema.as_object_mut() {
        obj.remove("$schema");
    }
    Ok(schema)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Deserialize, JsonSchema)]
    struct EchoParams {
        /// Text to echo back.
        text: String,
        #[serde(default)]
        shout: Option<bool>,
    }

    fn registry() -> ToolRegistry {
        let mut registry = ToolRegistry::new();
        registry
            .register("echo", "Echo text back", |p: EchoParams| async move {
                if p.shout.unwrap_or(false) {
                    CallToolResult::text(p.text.to_uppercase())
                } else {
                    CallToolResult::text(p.text)
                }
            })
            .unwrap();
        registry
    }

    #[test]
    fn schema_is_generated_from_params() {
        let registry = registry();
        let tool = registry.get("echo").unwrap();
        let schema = &tool.input_schema;
        assert_eq!(schema["type"], "object");
        assert!(schema["properties"]["text"].is_object());
        assert!(schema["properties"]["shout"].is_object());
        assert_eq!(schema["required"], serde_json::json!(["text"]));
        assert!(schema.get("$schema").is_none());
    }

    #[test]
    fn duplicate_names_are_rejected() {
        let mut registry = registry();
        let err = registry
            .register("echo", "again", |p: EchoParams| async move {
                CallToolResult::text(p.text)
            })
            .err()
            .unwrap();
        assert!(matches!(err, Error::DuplicateTool(name) if name == "echo"));
    }

    #[tokio::test]
    async fn call_dispatches_typed_params() {
        let result = registry()
            .call("echo", Some(serde_json::json!({"text": "hi", "shout": true})))
            .await
            .unwrap();
        assert_eq!(result.joined_text(), "HI");
        assert!(!result.is_error);
    }

    #[tokio::test]
    async fn bad_arguments_are_invalid_params() {
        let err = registry()
            .call("echo", Some(serde_json::json!({"text": 5})))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::InvalidParams { tool, .. } if tool == "echo"));
    }

    #[tokio::test]
    async fn unknown_tool_is_reported() {
        let err = registry().call("nope", None).await.unwrap_err();
        assert!(matches!(err, Error::ToolNotFound(_)));
    }
}
