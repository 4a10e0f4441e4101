//! Subcommand implementations; each returns the text to print

use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use jscbind::{JsContext, JsError, JsValue};
use tracing::debug;

/// Where the starting value comes from
pub enum Input {
    Script { source: String, url: String },
    Json(String),
}

impl Input {
    /// An inline script or a script file, exactly one of them
    pub fn script(inline: Option<String>, file: Option<PathBuf>) -> Result<Self> {
        match (inline, file) {
            (Some(source), None) => Ok(Input::Script {
                source,
                url: "<command line>".into(),
            }),
            (None, Some(path)) => Self::from_file(path),
            (Some(_), Some(_)) => bail!("pass either a script or --file, not both"),
            (None, None) => bail!("no script given (pass one inline or with --file)"),
        }
    }

    /// The document `get` reads from: inline JSON or a script file
    pub fn document(json: Option<String>, file: Option<PathBuf>) -> Result<Self> {
        match (json, file) {
            (Some(json), None) => Ok(Input::Json(json)),
            (None, Some(path)) => Self::from_file(path),
            (Some(_), Some(_)) => bail!("pass either --json or --file, not both"),
            (None, None) => bail!("nothing to read (pass --json or --file)"),
        }
    }

    pub fn from_file(path: PathBuf) -> Result<Self> {
        let source = fs::read_to_string(&path)
            .with_context(|| format!("failed to read script: {}", path.display()))?;
        Ok(Input::Script {
            source,
            url: path.display().to_string(),
        })
    }

    fn load(&self, ctx: &JsContext) -> Result<JsValue> {
        match self {
            Input::Script { source, url } => {
                debug!(%url, "evaluating script");
                Ok(ctx.eval_with_source(source, url)?)
            }
            Input::Json(json) => Ok(ctx.from_json(json)?),
        }
    }
}

/// Output formatting options
pub struct Output {
    pub indent: u32,
}

impl Output {
    fn render(&self, value: &JsValue) -> Result<String> {
        match value.to_json_string(self.indent) {
            Ok(json) => Ok(json),
            // JSON has no spelling for these; print what a REPL would
            Err(JsError::NotSerializable) => Ok(value.to_string()?),
            Err(e) => Err(e.into()),
        }
    }
}

pub fn eval(input: &Input, output: &Output) -> Result<String> {
    let ctx = JsContext::new()?;
    let value = input.load(&ctx)?;
    output.render(&value)
}

pub fn get(input: &Input, path: &str, output: &Output) -> Result<String> {
    let ctx = JsContext::new()?;
    let mut value = input.load(&ctx)?;

    let mut walked = String::new();
    for segment in path.split('.').filter(|s| !s.is_empty()) {
        if !walked.is_empty() {
            walked.push('.');
        }
        walked.push_str(segment);

        value = value
            .into_object()
            .and_then(|obj| obj.get_property(segment))
            .with_context(|| format!("cannot read `{walked}`"))?;
    }

    output.render(&value)
}

pub fn call(prelude: Option<&Input>, function: &str, args: &str, output: &Output) -> Result<String> {
    let ctx = JsContext::new()?;
    if let Some(prelude) = prelude {
        prelude.load(&ctx)?;
    }

    let func = ctx
        .get_global(function)?
        .into_object()
        .with_context(|| format!("`{function}` is not defined"))?;

    let args = ctx.from_json(args).context("--args must be a JSON array")?;
    if !args.is_array() {
        bail!("--args must be a JSON array");
    }
    let args = args.into_object()?;
    let values = (0..args.length()?)
        .map(|i| args.get_index(i))
        .collect::<Result<Vec<_>, _>>()?;
    let refs: Vec<&JsValue> = values.iter().collect();

    debug!(function, argc = refs.len(), "calling function");
    let result = func.call_as_function(&refs)?;
    output.render(&result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn compact() -> Output {
        Output { indent: 0 }
    }

    fn inline(source: &str) -> Input {
        Input::script(Some(source.into()), None).unwrap()
    }

    #[test]
    fn test_eval_prints_json() {
        let out = eval(&inline("({ a: [1, 2], b: 'c' })"), &compact()).unwrap();
        assert_eq!(out, r#"{"a":[1,2],"b":"c"}"#);
    }

    #[test]
    fn test_eval_indent() {
        let out = eval(&inline("({ a: 1 })"), &Output { indent: 4 }).unwrap();
        assert_eq!(out, "{\n    \"a\": 1\n}");
    }

    #[test]
    fn test_eval_undefined() {
        assert_eq!(eval(&inline("void 0"), &compact()).unwrap(), "undefined");
    }

    #[test]
    fn test_eval_exception() {
        let err = eval(&inline("throw new Error('bad')"), &compact()).unwrap_err();
        assert_eq!(err.to_string(), "Exception evaluating script: Error: bad");
    }

    #[test]
    fn test_eval_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "const x = 20;\nx + 22").unwrap();

        let input = Input::script(None, Some(file.path().to_path_buf())).unwrap();
        assert_eq!(eval(&input, &compact()).unwrap(), "42");
    }

    #[test]
    fn test_script_source_required() {
        assert!(Input::script(None, None).is_err());
        assert!(Input::script(Some("1".into()), Some(PathBuf::from("x.js"))).is_err());
    }

    #[test]
    fn test_document_source_required() {
        let err = Input::document(None, None).err().unwrap();
        assert_eq!(err.to_string(), "nothing to read (pass --json or --file)");
        assert!(matches!(
            Input::document(Some("{}".into()), None).unwrap(),
            Input::Json(_)
        ));
    }

    #[test]
    fn test_get_path() {
        let input = Input::Json(r#"{"user":{"name":"ada","langs":["en","fr"]}}"#.into());
        assert_eq!(get(&input, "user.name", &compact()).unwrap(), r#""ada""#);
        assert_eq!(get(&input, "user.langs.1", &compact()).unwrap(), r#""fr""#);
        assert_eq!(get(&input, "user.missing", &compact()).unwrap(), "undefined");
        assert_eq!(
            get(&input, "", &compact()).unwrap(),
            r#"{"user":{"name":"ada","langs":["en","fr"]}}"#
        );
    }

    #[test]
    fn test_get_through_null() {
        let input = Input::Json(r#"{"a":null}"#.into());
        let err = get(&input, "a.b", &compact()).unwrap_err();
        assert_eq!(err.to_string(), "cannot read `a.b`");
        assert!(
            format!("{:#}", err).contains("Failed to convert to object: TypeError")
        );
    }

    #[test]
    fn test_get_invalid_json() {
        let err = get(&Input::Json("{".into()), "a", &compact()).unwrap_err();
        assert_eq!(err.to_string(), "Failed to create String from JSON");
    }

    #[test]
    fn test_call() {
        let prelude = inline("function greet(name, n) { return { hi: name.repeat(n) }; }");
        let out = call(Some(&prelude), "greet", r#"["ab", 2]"#, &compact()).unwrap();
        assert_eq!(out, r#"{"hi":"abab"}"#);
    }

    #[test]
    fn test_call_builtin() {
        let out = call(None, "parseInt", r#"["ff", 16]"#, &compact()).unwrap();
        assert_eq!(out, "255");
    }

    #[test]
    fn test_call_throwing() {
        let prelude = inline("function fail() { throw new RangeError('nope'); }");
        let err = call(Some(&prelude), "fail", "[]", &compact()).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Exception calling JS function: RangeError: nope"
        );
    }

    #[test]
    fn test_call_undefined_function() {
        let err = call(None, "nothing", "[]", &compact()).unwrap_err();
        assert_eq!(err.to_string(), "`nothing` is not defined");
    }

    #[test]
    fn test_call_args_not_array() {
        let err = call(None, "parseInt", r#"{"a":1}"#, &compact()).unwrap_err();
        assert_eq!(err.to_string(), "--args must be a JSON array");
    }
}
