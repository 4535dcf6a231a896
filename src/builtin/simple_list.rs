use semver::Version;

use super::{child_text, write_text};
use crate::extension::{ExtensionDescriptor, ExtensionKind, SyndicationExtension};
use crate::xml::{XmlNavigator, XmlWriteError, XmlWriter};

static DESCRIPTOR: ExtensionDescriptor = ExtensionDescriptor::from_static(
    "cf",
    "http://www.microsoft.com/schemas/rss/core/2005",
    Version::new(1, 0, 0),
    "Simple List",
    Some("Marks a feed as an ordered list and names its sortable and groupable fields."),
    Some("http://msdn.microsoft.com/en-us/library/bb280054.aspx"),
);

/// A field clients may sort the list by (`cf:sort`).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SortProperty {
    /// Namespace of the sorted element; `None` means the feed's own namespace.
    pub namespace: Option<String>,
    pub element: Option<String>,
    pub label: Option<String>,
    /// One of `text`, `number` or `date`; `text` when absent.
    pub data_type: Option<String>,
    pub is_default: bool,
}

/// A field clients may group the list by (`cf:group`).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GroupProperty {
    pub namespace: Option<String>,
    pub element: Option<String>,
    pub label: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SimpleListContext {
    /// Value of `cf:treatAs`, normally `list`.
    pub treat_as: Option<String>,
    pub sorts: Vec<SortProperty>,
    pub groups: Vec<GroupProperty>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SimpleListExtension {
    pub context: SimpleListContext,
}

fn owned_attr(node: &XmlNavigator<'_>, name: &str) -> Option<String> {
    node.attribute(name, None)
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

fn write_attr(
    writer: &mut XmlWriter,
    name: &str,
    value: Option<&str>,
) -> Result<(), XmlWriteError> {
    match value {
        Some(value) => writer.attribute(name, value),
        None => Ok(()),
    }
}

impl SyndicationExtension for SimpleListExtension {
    fn kind(&self) -> ExtensionKind {
        ExtensionKind::SimpleList
    }

    fn descriptor(&self) -> &ExtensionDescriptor {
        &DESCRIPTOR
    }

    fn load(&mut self, source: &XmlNavigator<'_>) -> bool {
        let ns = Some(DESCRIPTOR.namespace());
        self.context.treat_as = child_text(source, &DESCRIPTOR, "treatAs");
        self.context.sorts.clear();
        self.context.groups.clear();

        for info in source.children_named("listinfo", ns) {
            for node in info.children() {
                if node.is("sort", ns) {
                    self.context.sorts.push(SortProperty {
                        namespace: owned_attr(&node, "ns"),
                        element: owned_attr(&node, "element"),
                        label: owned_attr(&node, "label"),
                        data_type: owned_attr(&node, "data-type"),
                        is_default: matches!(node.attribute("default", None), Some("true")),
                    });
                } else if node.is("group", ns) {
                    self.context.groups.push(GroupProperty {
                        namespace: owned_attr(&node, "ns"),
                        element: owned_attr(&node, "element"),
                        label: owned_attr(&node, "label"),
                    });
                }
            }
        }
        self.context != SimpleListContext::default()
    }

    fn write_to(&self, writer: &mut XmlWriter) -> Result<(), XmlWriteError> {
        let c = &self.context;
        let prefix = Some(DESCRIPTOR.prefix());
        let ns = Some(DESCRIPTOR.namespace());

        write_text(writer, &DESCRIPTOR, "treatAs", c.treat_as.as_deref())?;
        if c.sorts.is_empty() && c.groups.is_empty() {
            return Ok(());
        }

        writer.start_element(prefix, "listinfo", ns)?;
        for sort in &c.sorts {
            writer.start_element(prefix, "sort", ns)?;
            write_attr(writer, "ns", sort.namespace.as_deref())?;
            write_attr(writer, "element", sort.element.as_deref())?;
            write_attr(writer, "label", sort.label.as_deref())?;
            write_attr(writer, "data-type", sort.data_type.as_deref())?;
            if sort.is_default {
                writer.attribute("default", "true")?;
            }
            writer.end_element()?;
        }
        for group in &c.groups {
            writer.start_element(prefix, "group", ns)?;
            write_attr(writer, "ns", group.namespace.as_deref())?;
            write_attr(writer, "element", group.element.as_deref())?;
            write_attr(writer, "label", group.label.as_deref())?;
            writer.end_element()?;
        }
        writer.end_element()
    }

    impl_extension_basics!();
}
