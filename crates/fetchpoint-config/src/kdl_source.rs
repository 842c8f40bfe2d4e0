use config::{ConfigError, FileStoredFormat, Format, Map, Source, Value, ValueKind};
use kdl::{KdlDocument, KdlNode, KdlValue};

/// Reads the children of the toplevel `options` node as config keys.
#[derive(Clone, Debug)]
pub(crate) struct KdlSource(KdlDocument);

impl Source for KdlSource {
    fn clone_into_box(&self) -> Box<dyn Source + Send + Sync> {
        Box::new(self.clone())
    }

    fn collect(&self) -> Result<Map<String, Value>, ConfigError> {
        let mut map = Map::new();
        if let Some(config_node) = self.0.get("options") {
            if let Some(children) = config_node.children() {
                for node in children.nodes() {
                    map.insert(node.name().value().to_string(), node_value(node));
                }
            }
        }
        Ok(map)
    }
}

#[derive(Clone, Debug)]
pub(crate) struct KdlFormat;

impl Format for KdlFormat {
    fn parse(
        &self,
        _uri: Option<&String>,
        text: &str,
    ) -> Result<Map<String, Value>, Box<dyn std::error::Error + Send + Sync>> {
        Ok(KdlSource(text.parse()?).collect()?)
    }
}

impl FileStoredFormat for KdlFormat {
    fn file_extensions(&self) -> &'static [&'static str] {
        &["kdl"]
    }
}

fn value_kind(value: &KdlValue) -> ValueKind {
    if let Some(str) = value.as_string() {
        ValueKind::String(str.into())
    } else if let Some(num) = value.as_i64() {
        ValueKind::I64(num)
    } else if let Some(float) = value.as_f64() {
        ValueKind::Float(float)
    } else if let Some(boolean) = value.as_bool() {
        ValueKind::Boolean(boolean)
    } else {
        ValueKind::Nil
    }
}

fn node_value(node: &KdlNode) -> Value {
    let args = node
        .entries()
        .iter()
        .filter(|e| e.name().is_none())
        .collect::<Vec<_>>();
    let props = node
        .entries()
        .iter()
        .filter_map(|e| e.name().map(|name| (name.value().to_string(), e.value())))
        .collect::<Vec<_>>();

    // base_url "http://localhost:8000" => { base_url: "http://localhost:8000" }
    if args.len() == 1 && props.is_empty() && node.children().is_none() {
        return Value::new(None, value_kind(args[0].value()));
    }
    // tags "a" "b" => { tags: ["a", "b"] }
    if !args.is_empty() && props.is_empty() && node.children().is_none() {
        return Value::new(
            None,
            ValueKind::Array(
                args.iter()
                    .map(|e| Value::new(None, value_kind(e.value())))
                    .collect(),
            ),
        );
    }
    if let Some(children) = node.children() {
        let dash_children = !children.nodes().is_empty()
            && children
                .nodes()
                .iter()
                .all(|node| node.name().value() == "-");
        if dash_children && props.is_empty() {
            // tags {
            //   - "a"
            //   - "b"
            // }
            // => { tags: ["a", "b"] }
            return Value::new(
                None,
                ValueKind::Array(children.nodes().iter().map(node_value).collect()),
            );
        }
    }

    // cases method="GET" uri="/cases"
    // => { cases: { method: "GET", uri: "/cases" } }
    //
    // endpoints {
    //     cases method="GET" uri="/cases"
    // }
    // => { endpoints: { cases: { ... } } }
    let mut table = props
        .into_iter()
        .map(|(name, value)| (name, Value::new(None, value_kind(value))))
        .collect::<Map<String, Value>>();
    if let Some(children) = node.children() {
        for child in children.nodes() {
            table.insert(child.name().value().to_string(), node_value(child));
        }
    }
    if table.is_empty() {
        Value::new(None, ValueKind::Nil)
    } else {
        Value::new(None, ValueKind::Table(table))
    }
}
