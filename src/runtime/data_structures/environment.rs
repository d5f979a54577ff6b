use crate::{
    lang::{code::ByteCode, source_buffer::SourceLocation},
    runtime::interpreter::WordHandler,
};
use std::{
    cell::RefCell,
    collections::HashMap,
    fmt::{self, Display, Formatter},
    rc::Rc,
};

/// What runs when a word is called.
#[derive(Clone)]
pub enum WordBody {
    /// The word is a native word written in Rust, registered by the host.
    Native(Rc<WordHandler>),

    /// The word was defined by the script with `: name ... ;`.
    Scripted(Rc<ByteCode>),
}

/// The information stored in an environment for each word.
#[derive(Clone)]
pub struct WordInfo {
    /// The location in the source code where the word was defined.
    pub location: SourceLocation,

    pub name: String,

    /// A simple description of the word.  Scripted words have none.
    pub description: String,

    pub body: WordBody,
}

impl WordInfo {
    pub fn new(
        location: SourceLocation,
        name: String,
        description: String,
        body: WordBody,
    ) -> WordInfo {
        WordInfo {
            location,
            name,
            description,
            body,
        }
    }

    pub fn is_native(&self) -> bool {
        matches!(self.body, WordBody::Native(_))
    }
}

/// Environments are shared between the scope chain and any stack values that refer to them.
pub type EnvironmentPtr = Rc<Environment>;

/// One scope of the word dictionary.  Lookups that miss here fall through to the parent, so a
/// child sees every word of its ancestors while its own definitions stay invisible to them.
///
/// The chain ends at the host surface, a parentless environment holding the embedder's native
/// words.
pub struct Environment {
    words: RefCell<HashMap<String, WordInfo>>,
    parent: Option<EnvironmentPtr>,
}

/// List the words visible from this scope, the nearest definition of each name winning.
impl Display for Environment {
    fn fmt(&self, formatter: &mut Formatter) -> fmt::Result {
        let merged = self.get_merged();
        let max_size = merged.keys().map(|name| name.len()).max().unwrap_or(0);

        let mut names: Vec<&String> = merged.keys().collect();
        names.sort();

        writeln!(formatter, "{} words defined.\n", merged.len())?;

        for name in names {
            let word = &merged[name];
            let kind = if word.is_native() { "native" } else { "script" };

            writeln!(
                formatter,
                "{:width$}  {}  --  {}",
                name,
                kind,
                word.description,
                width = max_size
            )?;
        }

        Ok(())
    }
}

impl Environment {
    /// Create the parentless host surface that ends every scope chain.
    pub fn new_host() -> EnvironmentPtr {
        Rc::new(Environment {
            words: RefCell::new(HashMap::new()),
            parent: None,
        })
    }

    /// Create a new scope whose lookups fall back to `parent`.
    pub fn new_child(parent: &EnvironmentPtr) -> EnvironmentPtr {
        Rc::new(Environment {
            words: RefCell::new(HashMap::new()),
            parent: Some(parent.clone()),
        })
    }

    pub fn parent(&self) -> Option<&EnvironmentPtr> {
        self.parent.as_ref()
    }

    /// How many ancestors this scope has.  The host surface is at depth 0.
    pub fn depth(&self) -> usize {
        let mut depth = 0;
        let mut current = self.parent.as_ref();

        while let Some(environment) = current {
            depth += 1;
            current = environment.parent.as_ref();
        }

        depth
    }

    /// Bind a word in this scope, replacing any earlier binding of the same name here.  Bindings
    /// of the name in ancestor scopes are shadowed, not changed.
    pub fn define(&self, info: WordInfo) {
        let _ = self.words.borrow_mut().insert(info.name.clone(), info);
    }

    /// Find a word by walking from this scope up through its ancestors.
    pub fn lookup(&self, name: &str) -> Option<WordInfo> {
        if let Some(found) = self.words.borrow().get(name) {
            return Some(found.clone());
        }

        self.parent.as_ref()?.lookup(name)
    }

    /// Is the word bound in this scope itself, ignoring ancestors?
    pub fn contains_local(&self, name: &str) -> bool {
        self.words.borrow().contains_key(name)
    }

    /// The names bound in this scope itself, sorted.
    pub fn local_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.words.borrow().keys().cloned().collect();

        names.sort();
        names
    }

    /// Number of words bound in this scope itself.
    pub fn len(&self) -> usize {
        self.words.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Every word visible from this scope.  If a name is bound at several levels only the nearest
    /// binding is kept.
    pub fn get_merged(&self) -> HashMap<String, WordInfo> {
        let mut merged = match &self.parent {
            Some(parent) => parent.get_merged(),
            None => HashMap::new(),
        };

        for (name, info) in self.words.borrow().iter() {
            let _ = merged.insert(name.clone(), info.clone());
        }

        merged
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scripted(name: &str) -> WordInfo {
        WordInfo::new(
            SourceLocation::default(),
            name.to_string(),
            String::new(),
            WordBody::Scripted(Rc::new(ByteCode::new())),
        )
    }

    #[test]
    fn lookup_falls_through_to_ancestors() {
        let host = Environment::new_host();
        let root = Environment::new_child(&host);
        let package = Environment::new_child(&root);

        host.define(scripted("from-host"));
        root.define(scripted("from-root"));

        assert!(package.lookup("from-host").is_some());
        assert!(package.lookup("from-root").is_some());
        assert!(package.lookup("missing").is_none());
        assert_eq!(package.depth(), 2);
    }

    #[test]
    fn child_definitions_stay_in_the_child() {
        let root = Environment::new_child(&Environment::new_host());
        let package = Environment::new_child(&root);

        package.define(scripted("inner"));

        assert!(package.contains_local("inner"));
        assert!(root.lookup("inner").is_none());
    }

    #[test]
    fn merged_listing_prefers_nearest_binding() {
        let root = Environment::new_child(&Environment::new_host());
        let package = Environment::new_child(&root);

        root.define(scripted("shared"));
        package.define(WordInfo {
            description: "inner".to_string(),
            ..scripted("shared")
        });

        let merged = package.get_merged();

        assert_eq!(merged.len(), 1);
        assert_eq!(merged["shared"].description, "inner");
    }
}
