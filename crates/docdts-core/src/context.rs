//! The per-run registry of namespaces and classes.

use crate::config::GenerateConfig;
use crate::diagnostics::{DiagnosticCategory, DiagnosticCollector};
use crate::error::{GenerateError, GenerateResult};
use crate::input::{DocFile, ItemRecord};
use crate::model::{ClassId, Klass, KlassData, KlassKind, Member, ResolveState};
use crate::namespace::{NamespaceId, NamespaceTree};

/// State of one generation run: namespace tree, class table and diagnostics.
///
/// Registration and resolution mutate the context; emission only reads it.
#[derive(Debug)]
pub struct Context {
    config: GenerateConfig,
    namespaces: NamespaceTree,
    classes: Vec<Klass>,
    diagnostics: DiagnosticCollector,
}

impl Context {
    pub fn new(config: GenerateConfig) -> Self {
        Self {
            config,
            namespaces: NamespaceTree::new(),
            classes: Vec::new(),
            diagnostics: DiagnosticCollector::new(),
        }
    }

    pub fn config(&self) -> &GenerateConfig {
        &self.config
    }

    pub fn namespaces(&self) -> &NamespaceTree {
        &self.namespaces
    }

    pub fn class(&self, id: ClassId) -> &Klass {
        &self.classes[id.0]
    }

    pub(crate) fn class_mut(&mut self, id: ClassId) -> &mut Klass {
        &mut self.classes[id.0]
    }

    /// All class ids in registration order.
    pub fn class_ids(&self) -> impl Iterator<Item = ClassId> {
        (0..self.classes.len()).map(ClassId)
    }

    pub fn classes(&self) -> impl Iterator<Item = &Klass> {
        self.classes.iter()
    }

    pub fn diagnostics(&self) -> &DiagnosticCollector {
        &self.diagnostics
    }

    pub(crate) fn diagnostics_mut(&mut self) -> &mut DiagnosticCollector {
        &mut self.diagnostics
    }

    pub fn into_diagnostics(self) -> DiagnosticCollector {
        self.diagnostics
    }

    /// Split a full name into canonical namespace path and simple name.
    fn split_name(&self, full_name: &str) -> (String, String) {
        match full_name.rsplit_once('.') {
            Some((namespace, simple)) => {
                (self.config.canonical_namespace(namespace), simple.to_string())
            }
            None => (String::new(), full_name.to_string()),
        }
    }

    /// Register a class, creating its namespace as needed.
    ///
    /// Returns `None` (and records a warning) when a class with the same simple
    /// name already lives in that namespace; the first registration is kept.
    pub fn register(&mut self, full_name: &str, data: KlassData) -> Option<ClassId> {
        let (namespace_path, simple_name) = self.split_name(full_name);
        let namespace = self.namespaces.find_or_create(&namespace_path);

        if let Some(&existing) = self.namespaces.get(namespace).classes.get(&simple_name) {
            let message = format!(
                "class `{}` is already registered; keeping the first definition",
                self.class(existing).full_name
            );
            self.diagnostics.warning_at(
                full_name,
                DiagnosticCategory::DuplicateClass,
                &message,
                None,
                data.location,
            );
            return None;
        }

        let canonical = if namespace_path.is_empty() {
            simple_name.clone()
        } else {
            format!("{}.{}", namespace_path, simple_name)
        };
        let id = ClassId(self.classes.len());
        let generics = self
            .config
            .generics
            .get(&canonical)
            .cloned()
            .unwrap_or_default();

        self.classes.push(Klass {
            simple_name: simple_name.clone(),
            full_name: canonical,
            kind: if data.ambient {
                KlassKind::Interface
            } else {
                KlassKind::Class
            },
            is_true_class: data.extends.is_some() || !data.uses.is_empty(),
            is_namespace: false,
            extends_name: data.extends,
            extends: None,
            uses_names: data.uses,
            mixins: Vec::new(),
            members: Default::default(),
            generics,
            private: data.private,
            deprecated: data.deprecated,
            deprecation_message: data.deprecation_message,
            description: data.description,
            location: data.location,
            state: ResolveState::Unresolved,
        });
        self.namespaces
            .get_mut(namespace)
            .classes
            .insert(simple_name, id);
        Some(id)
    }

    /// Look up a class without creating anything.
    ///
    /// A missing namespace is `Ok(None)` when `allow_missing_namespace` is set
    /// and [`GenerateError::MissingNamespace`] otherwise. A missing class in an
    /// existing namespace is always `Ok(None)`.
    pub fn lookup(
        &self,
        full_name: &str,
        allow_missing_namespace: bool,
    ) -> GenerateResult<Option<ClassId>> {
        let (namespace_path, simple_name) = self.split_name(full_name);
        match self.namespaces.find(&namespace_path) {
            Some(namespace) => Ok(self
                .namespaces
                .get(namespace)
                .classes
                .get(&simple_name)
                .copied()),
            None if allow_missing_namespace => Ok(None),
            None => Err(GenerateError::MissingNamespace(namespace_path)),
        }
    }

    /// Non-fatal lookup.
    pub fn find_class(&self, full_name: &str) -> Option<ClassId> {
        self.lookup(full_name, true).ok().flatten()
    }

    /// The namespace a class is registered in.
    pub fn namespace_of(&self, id: ClassId) -> Option<NamespaceId> {
        let (namespace_path, _) = self.split_name(&self.class(id).full_name);
        self.namespaces.find(&namespace_path)
    }

    /// Register every class, the ambient types and then every item, in input
    /// order.
    pub fn load(&mut self, doc: &DocFile) -> GenerateResult<()> {
        for (key, record) in &doc.classes {
            let name = if record.name.is_empty() {
                key.as_str()
            } else {
                record.name.as_str()
            };
            if self.config.is_excluded(name) {
                self.diagnostics.stats_mut().excluded_records += 1;
                self.diagnostics
                    .info(name, DiagnosticCategory::Skipped, "class excluded by configuration");
                continue;
            }
            let data = KlassData {
                extends: record.extends.clone().filter(|e| !e.is_empty()),
                uses: record.uses.clone(),
                ambient: false,
                private: record.is_private(),
                deprecated: record.deprecated,
                deprecation_message: record.deprecation_message.clone(),
                description: record.description.clone(),
                location: record.location(),
            };
            if self.register(name, data).is_some() {
                self.diagnostics.stats_mut().classes += 1;
            }
        }

        self.link_extensions(doc);

        for name in self.config.ambient_types.clone() {
            if self.find_class(&name).is_some() {
                continue;
            }
            let data = KlassData {
                ambient: true,
                ..Default::default()
            };
            if self.register(&name, data).is_some() {
                self.diagnostics.stats_mut().ambient_types += 1;
            }
        }

        for item in &doc.classitems {
            self.attach_item(item)?;
        }

        self.diagnostics.stats_mut().namespaces = self.namespaces.len() - 1;
        tracing::debug!(
            classes = self.classes.len(),
            namespaces = self.namespaces.len() - 1,
            "registration complete"
        );
        Ok(())
    }

    /// `extension_for` hosts receive the extending class as a mixin.
    fn link_extensions(&mut self, doc: &DocFile) {
        for (key, record) in &doc.classes {
            let name = if record.name.is_empty() { key } else { &record.name };
            if record.extension_for.is_empty() || self.config.is_excluded(name) {
                continue;
            }
            for host in &record.extension_for {
                let Some(host_id) = self.find_class(host) else {
                    tracing::debug!(host = %host, mixin = %name, "extension host not documented");
                    continue;
                };
                let klass = self.class_mut(host_id);
                if !klass.uses_names.contains(name) {
                    klass.uses_names.push(name.clone());
                }
            }
        }
    }

    /// Attach one item to its owning class.
    fn attach_item(&mut self, item: &ItemRecord) -> GenerateResult<()> {
        if item.itemtype.is_none() {
            return Ok(());
        }
        let Some(name) = item.name.as_deref().filter(|n| !n.is_empty()) else {
            self.diagnostics.warning_at(
                &item.class,
                DiagnosticCategory::Skipped,
                "item has no name",
                None,
                item.location(),
            );
            return Ok(());
        };
        if self.config.is_excluded(&item.class) {
            self.diagnostics.stats_mut().excluded_records += 1;
            return Ok(());
        }

        let Some(owner) = self.lookup(&item.class, false)? else {
            self.diagnostics.warning_at(
                &format!("{}.{}", item.class, name),
                DiagnosticCategory::UnknownClass,
                &format!("owning class `{}` is not documented", item.class),
                Some("document the class or exclude its prefix"),
                item.location(),
            );
            return Ok(());
        };

        let owner_name = self.class(owner).full_name.clone();
        let member = Member::from_item(item, name, owner, &owner_name, &mut self.diagnostics)?;
        let qualified = format!("{}.{}", owner_name, name);

        if self.class(owner).deprecated && !member.deprecated {
            self.diagnostics.warning_at(
                &qualified,
                DiagnosticCategory::Deprecation,
                &format!("class `{}` is deprecated but this member is not", owner_name),
                None,
                item.location(),
            );
        }

        let key = member.key();
        if self.class(owner).members.contains_key(&key) {
            self.diagnostics.warning_at(
                &qualified,
                DiagnosticCategory::DuplicateMember,
                &format!("member `{}` is already defined; keeping the first definition", key),
                None,
                item.location(),
            );
            return Ok(());
        }

        self.class_mut(owner).members.insert(key, member);
        self.diagnostics.stats_mut().members += 1;
        Ok(())
    }
}
