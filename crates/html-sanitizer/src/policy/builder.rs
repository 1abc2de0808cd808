//! Chained construction of [`Policy`] values.

use std::sync::Arc;

use regex::Regex;
use rustc_hash::{FxHashMap, FxHashSet};

use crate::balancer::DEFAULT_NESTING_LIMIT;
use crate::css::CssSchema;
use crate::policy::{attr, url, AttrTransform, ElementRule, ElementTransform, Policy};
use crate::sink::Attribute;

/// Elements that mean nothing without at least one attribute and are
/// dropped when filtering leaves them bare, unless the policy says
/// otherwise via `allow_without_attributes`.
const DEFAULT_SKIP_IF_NO_ATTRIBUTES: &[&str] = &["a", "font", "img", "input", "span"];

/// Assembles a [`Policy`]. Every method consumes and returns the
/// builder; finish with [`PolicyBuilder::build`].
///
/// ```
/// use html_sanitizer::Policy;
///
/// let policy = Policy::builder()
///     .allow_elements(["a", "b", "i", "p"])
///     .allow_attributes(["href"]).on_elements(["a"])
///     .allow_standard_url_protocols()
///     .require_rel_nofollow_on_links()
///     .build();
/// ```
pub struct PolicyBuilder {
    elements: FxHashMap<Box<str>, ElementRule>,
    global_attrs: FxHashMap<Box<str>, Vec<AttrTransform>>,
    protocols: FxHashSet<Box<str>>,
    allow_relative_urls: bool,
    require_rel_nofollow: bool,
    allow_without_attributes: FxHashSet<Box<str>>,
    disallow_without_attributes: FxHashSet<Box<str>>,
    allow_text_in: FxHashSet<Box<str>>,
    styling: Option<CssSchema>,
    urls_in_styles: bool,
    nesting_limit: usize,
    pre_processor: Option<super::TextProcessor>,
    post_processor: Option<super::TextProcessor>,
}

impl PolicyBuilder {
    pub(crate) fn new() -> Self {
        Self {
            elements: FxHashMap::default(),
            global_attrs: FxHashMap::default(),
            protocols: FxHashSet::default(),
            allow_relative_urls: true,
            require_rel_nofollow: false,
            allow_without_attributes: FxHashSet::default(),
            disallow_without_attributes: FxHashSet::default(),
            allow_text_in: FxHashSet::default(),
            styling: None,
            urls_in_styles: false,
            nesting_limit: DEFAULT_NESTING_LIMIT,
            pre_processor: None,
            post_processor: None,
        }
    }

    fn rule_for(&mut self, name: &str) -> &mut ElementRule {
        self.elements
            .entry(name.to_ascii_lowercase().into())
            .or_insert_with(|| ElementRule {
                transforms: Vec::new(),
                attrs: FxHashMap::default(),
            })
    }

    /// Whitelists elements by name.
    pub fn allow_elements<I>(mut self, names: I) -> Self
    where
        I: IntoIterator,
        I::Item: AsRef<str>,
    {
        for name in names {
            self.rule_for(name.as_ref());
        }
        self
    }

    /// Whitelists elements and appends a transform to their chains.
    /// The transform may rename the element and rewrite its
    /// attributes, or reject it outright by returning `None`.
    pub fn allow_elements_with<F, I>(mut self, transform: F, names: I) -> Self
    where
        F: Fn(&str, Vec<Attribute>) -> Option<(String, Vec<Attribute>)> + Send + Sync + 'static,
        I: IntoIterator,
        I::Item: AsRef<str>,
    {
        let transform: ElementTransform = Arc::new(transform);
        for name in names {
            self.rule_for(name.as_ref()).transforms.push(transform.clone());
        }
        self
    }

    /// Removes elements whitelisted earlier.
    pub fn disallow_elements<I>(mut self, names: I) -> Self
    where
        I: IntoIterator,
        I::Item: AsRef<str>,
    {
        for name in names {
            self.elements.remove(name.as_ref().to_ascii_lowercase().as_str());
        }
        self
    }

    /// Starts an attribute whitelist entry; finish it with
    /// [`AttributeBuilder::globally`] or
    /// [`AttributeBuilder::on_elements`].
    pub fn allow_attributes<I>(self, names: I) -> AttributeBuilder
    where
        I: IntoIterator,
        I::Item: AsRef<str>,
    {
        AttributeBuilder {
            parent: self,
            names: names
                .into_iter()
                .map(|n| n.as_ref().to_ascii_lowercase().into())
                .collect(),
            chain: Vec::new(),
        }
    }

    /// Removes attributes from the global table and from every
    /// per-element chain.
    pub fn disallow_attributes<I>(mut self, names: I) -> Self
    where
        I: IntoIterator,
        I::Item: AsRef<str>,
    {
        for name in names {
            let name = name.as_ref().to_ascii_lowercase();
            self.global_attrs.remove(name.as_str());
            for rule in self.elements.values_mut() {
                rule.attrs.remove(name.as_str());
            }
        }
        self
    }

    /// Whitelists URL schemes for URL-typed attributes.
    pub fn allow_url_protocols<I>(mut self, schemes: I) -> Self
    where
        I: IntoIterator,
        I::Item: AsRef<str>,
    {
        for scheme in schemes {
            self.protocols.insert(scheme.as_ref().to_ascii_lowercase().into());
        }
        self
    }

    /// `http`, `https` and `mailto`.
    pub fn allow_standard_url_protocols(self) -> Self {
        self.allow_url_protocols(url::STANDARD_PROTOCOLS.iter().copied())
    }

    /// Whether URL-typed attributes may carry scheme-less (relative)
    /// values. On by default.
    pub fn allow_relative_urls(mut self, allow: bool) -> Self {
        self.allow_relative_urls = allow;
        self
    }

    /// Adds `rel="nofollow"` to every surviving link with an `href`.
    pub fn require_rel_nofollow_on_links(mut self) -> Self {
        self.require_rel_nofollow = true;
        self
    }

    /// Keeps these elements even when no attribute survives
    /// filtering.
    pub fn allow_without_attributes<I>(mut self, names: I) -> Self
    where
        I: IntoIterator,
        I::Item: AsRef<str>,
    {
        for name in names {
            self.allow_without_attributes
                .insert(name.as_ref().to_ascii_lowercase().into());
        }
        self
    }

    /// Drops these elements when no attribute survives filtering.
    pub fn disallow_without_attributes<I>(mut self, names: I) -> Self
    where
        I: IntoIterator,
        I::Item: AsRef<str>,
    {
        for name in names {
            self.disallow_without_attributes
                .insert(name.as_ref().to_ascii_lowercase().into());
        }
        self
    }

    /// Keeps text directly inside elements whose content model drops
    /// it by default (`table`, `ul`, `select`, ...).
    pub fn allow_text_in<I>(mut self, names: I) -> Self
    where
        I: IntoIterator,
        I::Item: AsRef<str>,
    {
        for name in names {
            self.allow_text_in
                .insert(name.as_ref().to_ascii_lowercase().into());
        }
        self
    }

    /// Enables `style` attribute filtering with the standard schema.
    pub fn allow_styling(self) -> Self {
        self.allow_styling_with(CssSchema::standard())
    }

    /// Enables `style` attribute filtering with a caller-supplied
    /// schema.
    pub fn allow_styling_with(mut self, schema: CssSchema) -> Self {
        self.styling = Some(schema);
        self
    }

    /// Permits `url(...)` values inside filtered styles, subject to
    /// the same URL protocol whitelist as markup attributes.
    pub fn allow_urls_in_styles(mut self) -> Self {
        self.urls_in_styles = true;
        self
    }

    /// Caps the output nesting depth; deeper opens are dropped.
    pub fn with_nesting_limit(mut self, limit: usize) -> Self {
        self.nesting_limit = limit.max(1);
        self
    }

    /// Runs over every text chunk before filtering.
    pub fn with_pre_processor<F>(mut self, f: F) -> Self
    where
        F: Fn(&str) -> String + Send + Sync + 'static,
    {
        self.pre_processor = Some(Arc::new(f));
        self
    }

    /// Runs over every surviving text chunk after filtering.
    pub fn with_post_processor<F>(mut self, f: F) -> Self
    where
        F: Fn(&str) -> String + Send + Sync + 'static,
    {
        self.post_processor = Some(Arc::new(f));
        self
    }

    pub fn build(mut self) -> Policy {
        /*
         * The legacy raw-text elements render as `pre`, so whitelisting
         * any of them implies whitelisting the substitute; without this
         * the substituted output would not survive re-sanitization.
         */
        if ["xmp", "listing", "plaintext"]
            .iter()
            .any(|name| self.elements.contains_key(*name))
        {
            self.rule_for("pre");
        }

        let mut skip_if_no_attributes: FxHashSet<Box<str>> = DEFAULT_SKIP_IF_NO_ATTRIBUTES
            .iter()
            .map(|n| (*n).into())
            .collect();
        skip_if_no_attributes.extend(self.disallow_without_attributes);
        for allowed in &self.allow_without_attributes {
            skip_if_no_attributes.remove(allowed);
        }

        Policy {
            elements: self.elements,
            global_attrs: self.global_attrs,
            protocols: self.protocols,
            allow_relative_urls: self.allow_relative_urls,
            require_rel_nofollow: self.require_rel_nofollow,
            skip_if_no_attributes,
            allow_text_in: self.allow_text_in,
            styling: self.styling,
            urls_in_styles: self.urls_in_styles,
            nesting_limit: self.nesting_limit,
            pre_processor: self.pre_processor,
            post_processor: self.post_processor,
        }
    }
}

/// Pending attribute whitelist entry: pick a value constraint, then
/// scope it globally or to specific elements.
pub struct AttributeBuilder {
    parent: PolicyBuilder,
    names: Vec<Box<str>>,
    chain: Vec<AttrTransform>,
}

impl AttributeBuilder {
    /// Constrains values to full matches of a pattern.
    pub fn matching(mut self, pattern: Regex) -> Self {
        self.chain.push(attr::matching(pattern));
        self
    }

    /// Constrains values to a fixed set, compared case-sensitively.
    pub fn matching_one_of<I>(mut self, values: I) -> Self
    where
        I: IntoIterator,
        I::Item: AsRef<str>,
    {
        let values: Vec<String> = values.into_iter().map(|v| v.as_ref().to_string()).collect();
        self.chain.push(attr::one_of(&values, false));
        self
    }

    /// Constrains values to a fixed set, ignoring ASCII case.
    pub fn matching_one_of_ignore_case<I>(mut self, values: I) -> Self
    where
        I: IntoIterator,
        I::Item: AsRef<str>,
    {
        let values: Vec<String> = values.into_iter().map(|v| v.as_ref().to_string()).collect();
        self.chain.push(attr::one_of(&values, true));
        self
    }

    /// Constrains values with a custom transform.
    pub fn matching_with<F>(mut self, transform: F) -> Self
    where
        F: Fn(&str, &str, String) -> Option<String> + Send + Sync + 'static,
    {
        self.chain.push(Arc::new(transform));
        self
    }

    /// Registers the attributes on every element.
    pub fn globally(self) -> PolicyBuilder {
        let Self {
            mut parent,
            names,
            chain,
        } = self;
        for name in names {
            parent
                .global_attrs
                .entry(name)
                .or_default()
                .extend(chain.iter().cloned());
        }
        parent
    }

    /// Registers the attributes on the named elements only.
    pub fn on_elements<I>(self, elements: I) -> PolicyBuilder
    where
        I: IntoIterator,
        I::Item: AsRef<str>,
    {
        let Self {
            mut parent,
            names,
            chain,
        } = self;
        for element in elements {
            let rule = parent.rule_for(element.as_ref());
            for name in &names {
                rule.attrs
                    .entry(name.clone())
                    .or_default()
                    .extend(chain.iter().cloned());
            }
        }
        parent
    }
}
