//! PDF merging with lopdf.
//!
//! Inputs are parsed one at a time so a broken or locked document fails the
//! job with an error naming that document. Encrypted inputs get one chance
//! with the empty password, which covers PDFs that are "locked" only
//! against editing; a real user password is a terminal failure.

use std::collections::BTreeMap;

use lopdf::{Document, Object, ObjectId};
use tracing::{info, warn};

use botones_core::config::{MERGE_MAX_INPUTS, MERGE_MIN_INPUTS};
use botones_storage::{OutputKind, StorageResolver};

use crate::artifact::{persist, timestamp_name, MergeOutcome};
use crate::download::fetch_all;
use crate::error::{MediaError, Result};
use crate::scratch::ScratchDir;
use crate::validate::{validate_inputs, InputKind, MediaSource};

/// Merge 2 to 5 PDFs into one document, pages in attachment order.
pub async fn merge_pdfs(
    client: &reqwest::Client,
    storage: &StorageResolver,
    sources: &[MediaSource],
) -> Result<MergeOutcome> {
    validate_inputs(InputKind::Pdf, sources, MERGE_MIN_INPUTS, MERGE_MAX_INPUTS)?;

    let scratch = ScratchDir::create("merge-pdfs").await?;
    let merged = run_merge(client, &scratch, sources).await;
    scratch.cleanup().await;
    let bytes = merged?;

    let file_name = timestamp_name("merged", "pdf");
    let saved_to = persist(storage, OutputKind::MergedPdfs, &file_name, &bytes);
    info!(inputs = sources.len(), bytes = bytes.len(), "pdfs merged");
    Ok(MergeOutcome {
        file_name,
        bytes,
        saved_to,
    })
}

async fn run_merge(
    client: &reqwest::Client,
    scratch: &ScratchDir,
    sources: &[MediaSource],
) -> Result<Vec<u8>> {
    let paths = fetch_all(client, scratch, sources).await?;

    let mut documents = Vec::with_capacity(paths.len());
    for (path, source) in paths.iter().zip(sources) {
        let bytes = tokio::fs::read(path).await?;
        documents.push(parse_document(&bytes, &source.name)?);
    }
    merge_documents(documents)
}

fn parse_document(bytes: &[u8], name: &str) -> Result<Document> {
    let mut doc = Document::load_mem(bytes).map_err(|err| MediaError::PdfParse {
        name: name.to_string(),
        detail: err.to_string(),
    })?;
    if doc.is_encrypted() && doc.decrypt("").is_err() {
        return Err(MediaError::PdfLocked {
            name: name.to_string(),
        });
    }
    Ok(doc)
}

/// Concatenate the documents' page trees under one catalog.
///
/// Objects from every input are renumbered into one id space, then a single
/// Pages node adopts all pages in input order. Outlines are dropped; page
/// anchors into them would dangle after renumbering.
fn merge_documents(documents: Vec<Document>) -> Result<Vec<u8>> {
    let mut max_id = 1;
    let mut documents_pages: BTreeMap<ObjectId, Object> = BTreeMap::new();
    let mut documents_objects: BTreeMap<ObjectId, Object> = BTreeMap::new();

    for mut doc in documents {
        doc.renumber_objects_with(max_id);
        max_id = doc.max_id + 1;

        for (_, object_id) in doc.get_pages() {
            match doc.get_object(object_id) {
                Ok(object) => {
                    documents_pages.insert(object_id, object.to_owned());
                }
                Err(err) => warn!(?object_id, %err, "skipping unreadable page object"),
            }
        }
        documents_objects.extend(doc.objects);
    }

    let mut catalog_slot: Option<(ObjectId, Object)> = None;
    let mut pages_slot: Option<(ObjectId, Object)> = None;
    let mut merged = Document::with_version("1.5");

    for (object_id, object) in documents_objects.iter() {
        match object.type_name().unwrap_or(b"") {
            // First catalog wins; later ones only contribute their pages.
            b"Catalog" => {
                catalog_slot = Some((
                    if let Some((id, _)) = catalog_slot {
                        id
                    } else {
                        *object_id
                    },
                    object.clone(),
                ));
            }
            // Pages nodes fold into one dictionary under the first id.
            b"Pages" => {
                if let Ok(dictionary) = object.as_dict() {
                    let mut dictionary = dictionary.clone();
                    if let Some((_, ref existing)) = pages_slot {
                        if let Ok(existing) = existing.as_dict() {
                            dictionary.extend(existing);
                        }
                    }
                    pages_slot = Some((
                        if let Some((id, _)) = pages_slot {
                            id
                        } else {
                            *object_id
                        },
                        Object::Dictionary(dictionary),
                    ));
                }
            }
            // Pages are re-inserted below with their new parent.
            b"Page" => {}
            b"Outlines" => {}
            b"Outline" => {}
            _ => {
                merged.objects.insert(*object_id, object.clone());
            }
        }
    }

    let (pages_id, pages_root) = pages_slot.ok_or_else(|| MediaError::PdfAssemble {
        detail: "no page tree found in the inputs".to_string(),
    })?;
    let (catalog_id, catalog) = catalog_slot.ok_or_else(|| MediaError::PdfAssemble {
        detail: "no document catalog found in the inputs".to_string(),
    })?;

    for (object_id, object) in documents_pages.iter() {
        if let Ok(dictionary) = object.as_dict() {
            let mut dictionary = dictionary.clone();
            dictionary.set("Parent", pages_id);
            merged
                .objects
                .insert(*object_id, Object::Dictionary(dictionary));
        }
    }

    if let Ok(dictionary) = pages_root.as_dict() {
        let mut dictionary = dictionary.clone();
        dictionary.set("Count", documents_pages.len() as u32);
        dictionary.set(
            "Kids",
            documents_pages
                .keys()
                .map(|id| Object::Reference(*id))
                .collect::<Vec<_>>(),
        );
        merged.objects.insert(pages_id, Object::Dictionary(dictionary));
    }

    if let Ok(dictionary) = catalog.as_dict() {
        let mut dictionary = dictionary.clone();
        dictionary.set("Pages", pages_id);
        dictionary.remove(b"Outlines");
        merged
            .objects
            .insert(catalog_id, Object::Dictionary(dictionary));
    }

    merged.trailer.set("Root", catalog_id);
    merged.max_id = merged.objects.len() as u32;
    merged.renumber_objects();
    merged.compress();

    let mut bytes = Vec::new();
    merged
        .save_to(&mut bytes)
        .map_err(|err| MediaError::PdfAssemble {
            detail: err.to_string(),
        })?;
    Ok(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use lopdf::content::{Content, Operation};
    use lopdf::{dictionary, EncryptionState, EncryptionVersion, Permissions, Stream};

    fn make_pdf(pages: usize, marker: &str) -> Vec<u8> {
        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();
        let font_id = doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => "Courier",
        });
        let resources_id = doc.add_object(dictionary! {
            "Font" => dictionary! { "F1" => font_id },
        });

        let mut kids: Vec<Object> = Vec::new();
        for i in 0..pages {
            let content = Content {
                operations: vec![
                    Operation::new("BT", vec![]),
                    Operation::new("Tf", vec!["F1".into(), 12.into()]),
                    Operation::new("Td", vec![72.into(), 720.into()]),
                    Operation::new(
                        "Tj",
                        vec![Object::string_literal(format!("{marker} page {}", i + 1))],
                    ),
                    Operation::new("ET", vec![]),
                ],
            };
            let content_id =
                doc.add_object(Stream::new(dictionary! {}, content.encode().unwrap()));
            let page_id = doc.add_object(dictionary! {
                "Type" => "Page",
                "Parent" => pages_id,
                "Contents" => content_id,
            });
            kids.push(page_id.into());
        }

        let count = kids.len() as u32;
        doc.objects.insert(
            pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => kids,
                "Count" => count,
                "Resources" => resources_id,
                "MediaBox" => vec![0.into(), 0.into(), 612.into(), 792.into()],
            }),
        );
        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        doc.trailer.set("Root", catalog_id);
        doc.compress();

        let mut bytes = Vec::new();
        doc.save_to(&mut bytes).unwrap();
        bytes
    }

    /// Re-save `make_pdf` output with standard-handler encryption under the
    /// given user password. An empty password mimics PDFs that are locked
    /// only against editing.
    fn encrypted_pdf(user_password: &str, marker: &str) -> Vec<u8> {
        let mut doc = Document::load_mem(&make_pdf(1, marker)).unwrap();
        // The standard security handler derives its key from the file ID.
        doc.trailer.set(
            "ID",
            Object::Array(vec![
                Object::string_literal(b"fixture".to_vec()),
                Object::string_literal(b"fixture".to_vec()),
            ]),
        );
        let state = EncryptionState::try_from(EncryptionVersion::V1 {
            document: &doc,
            owner_password: "dueno",
            user_password,
            permissions: Permissions::all(),
        })
        .unwrap();
        doc.encrypt(&state).unwrap();

        let mut bytes = Vec::new();
        doc.save_to(&mut bytes).unwrap();
        bytes
    }

    #[test]
    fn merged_document_has_all_pages_in_order() {
        let alpha = parse_document(&make_pdf(2, "alpha"), "alpha.pdf").unwrap();
        let beta = parse_document(&make_pdf(3, "beta"), "beta.pdf").unwrap();

        let bytes = merge_documents(vec![alpha, beta]).unwrap();
        let merged = Document::load_mem(&bytes).unwrap();

        assert_eq!(merged.get_pages().len(), 5);
        assert!(merged.extract_text(&[1]).unwrap().contains("alpha page 1"));
        assert!(merged.extract_text(&[3]).unwrap().contains("beta page 1"));
        assert!(merged.extract_text(&[5]).unwrap().contains("beta page 3"));
    }

    #[test]
    fn garbage_bytes_name_the_offending_document() {
        let err = parse_document(b"this is not a pdf", "notes.pdf").unwrap_err();
        match err {
            MediaError::PdfParse { name, .. } => assert_eq!(name, "notes.pdf"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn merging_nothing_reports_a_missing_page_tree() {
        let err = merge_documents(vec![]).unwrap_err();
        assert!(matches!(err, MediaError::PdfAssemble { .. }));
    }

    #[test]
    fn password_protected_document_is_named_in_the_failure() {
        let bytes = encrypted_pdf("secreto", "privado");
        let err = parse_document(&bytes, "contrato.pdf").unwrap_err();
        match err {
            MediaError::PdfLocked { name } => assert_eq!(name, "contrato.pdf"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn empty_password_document_unlocks_and_merges() {
        let bytes = encrypted_pdf("", "cerrado");
        let unlocked = parse_document(&bytes, "cerrado.pdf").unwrap();
        let plain = parse_document(&make_pdf(1, "abierto"), "abierto.pdf").unwrap();

        let merged_bytes = merge_documents(vec![unlocked, plain]).unwrap();
        let merged = Document::load_mem(&merged_bytes).unwrap();

        assert_eq!(merged.get_pages().len(), 2);
        assert!(merged.extract_text(&[1]).unwrap().contains("cerrado page 1"));
        assert!(merged.extract_text(&[2]).unwrap().contains("abierto page 1"));
    }

    #[test]
    fn merge_output_is_itself_parseable_input() {
        let a = parse_document(&make_pdf(1, "first"), "a.pdf").unwrap();
        let b = parse_document(&make_pdf(1, "second"), "b.pdf").unwrap();
        let bytes = merge_documents(vec![a, b]).unwrap();

        let reparsed = parse_document(&bytes, "merged.pdf").unwrap();
        assert_eq!(reparsed.get_pages().len(), 2);
    }
}
