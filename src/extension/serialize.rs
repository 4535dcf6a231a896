//! Writing extensions back out.

use super::{ExtensionCollection, ExtensionKind, ExtensionType};
use crate::xml::{XmlWriteError, XmlWriter};

/// Writes every extension into the open element of `writer`, in collection order.
///
/// Nothing is reordered or deduplicated.
pub fn write_all(
    extensions: &ExtensionCollection,
    writer: &mut XmlWriter,
) -> Result<(), XmlWriteError> {
    for extension in extensions.iter() {
        extension.write_to(writer)?;
    }
    Ok(())
}

/// Declares the namespace of each distinct type on the open start tag.
///
/// Meant for a document's root element, so that every extension written
/// further down shares one declaration. Types that cannot be instantiated
/// are skipped. So is a type whose prefix is already declared here for
/// another namespace; its elements declare their own binding when written.
/// Returns the number of declarations written.
pub fn write_namespace_declarations(
    types: &[ExtensionType],
    writer: &mut XmlWriter,
) -> Result<usize, XmlWriteError> {
    let mut seen: Vec<ExtensionKind> = Vec::with_capacity(types.len());
    let mut written = 0;
    for ty in types {
        if seen.contains(&ty.kind()) {
            continue;
        }
        seen.push(ty.kind());

        let Some(instance) = ty.instantiate() else {
            continue;
        };
        let descriptor = instance.descriptor();
        match writer.namespace_declaration(descriptor.prefix(), descriptor.namespace()) {
            Ok(true) => written += 1,
            Ok(false) => {}
            Err(XmlWriteError::PrefixConflict { prefix, existing }) => {
                tracing::warn!(
                    kind = %ty.kind(),
                    prefix = %prefix,
                    existing = %existing,
                    "Prefix already declared for another namespace, skipping declaration"
                );
            }
            Err(e) => return Err(e),
        }
    }
    Ok(written)
}
