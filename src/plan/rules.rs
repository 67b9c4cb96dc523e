//! The decision table mapping feature flags to a file plan.
//!
//! Every rule is a plain conditional over [`FeatureFlags`]. Rules run in a
//! fixed order so the resulting lists, and therefore the operator-facing
//! listings and archives, are stable between runs.

use std::path::PathBuf;

use super::FilePlan;
use crate::flags::FeatureFlags;
use crate::layout::DistributionLayout;

/// Office worker artifacts, as (file, resource folder).
const OFFICE_ARTIFACTS: &[(&str, &str)] = &[
    ("OfficeWorker.js", "office"),
    ("WebOfficeWorkerWasm.br.wasm", "office"),
    ("WebOfficeWorkerWasm.br.js.mem", "office"),
    ("WebOfficeWorker.br.js.mem", "office_asm"),
    ("WebOfficeWorker.br.mem", "office_resource"),
];
const OFFICE_RESOURCE_DIRS: &[&str] = &["office", "office_asm", "office_resource"];

const LEGACY_OFFICE_ARTIFACTS: &[(&str, &str)] = &[
    ("LegacyOfficeWorker.js", "legacyOffice"),
    ("WebB2XOfficeWorkerWasm.br.wasm", "legacyOffice"),
    ("WebB2XOfficeWorkerWasm.br.js.mem", "legacyOffice"),
    ("WebB2XOfficeWorker.br.js.mem", "legacyOffice_asm"),
    ("WebB2XOfficeWorker.br.mem", "legacyOffice_resource"),
];
const LEGACY_OFFICE_RESOURCE_DIRS: &[&str] =
    &["legacyOffice", "legacyOffice_asm", "legacyOffice_resource"];

const CONTENT_EDIT_ARTIFACTS: &[(&str, &str)] = &[
    ("InfixServerWasm.br.js.mem", "content_edit"),
    ("InfixServerWasm.br.wasm", "content_edit"),
    ("InfixServerWasm.gz.js.mem", "content_edit"),
    ("InfixServerModule.js", "content_edit"),
    ("InfixServerWasm.br.mem", "content_edit_resource"),
];
const CONTENT_EDIT_RESOURCE_DIRS: &[&str] = &["content_edit", "content_edit_resource"];

const OFFICE_EDITOR_ARTIFACTS: &[(&str, &str)] = &[
    ("OfficeEditorWorkerWasm.br.js.mem", "office_edit"),
    ("OfficeEditorWorkerWasm.br.wasm", "office_edit"),
    ("OfficeEditorModule.js", "office_edit"),
];
const OFFICE_EDITOR_RESOURCE_DIRS: &[&str] = &["office_edit"];

const SPREADSHEET_EDITOR_ARTIFACTS: &[(&str, &str)] = &[
    ("SpreadsheetEditorEngine.js", "spreadsheetEditor"),
    ("SpreadsheetEditorEngine.wasm", "spreadsheetEditor"),
    ("SpreadsheetEditorModule.js", "spreadsheetEditor"),
    ("SpreadsheetEditor.css", "spreadsheetEditor"),
    ("styles.css", "spreadsheetEditor"),
    ("jquery-3.7.1.min.js", "spreadsheetEditor"),
    ("jquery.mousewheel-3.1.13.min.js", "spreadsheetEditor"),
    ("SpreadsheetEditor.js", "spreadsheetEditor"),
];
const SPREADSHEET_EDITOR_RESOURCE_DIRS: &[&str] = &["spreadsheetEditor"];

/// Core files copied into the package mirror of the archival bundle.
const ARCHIVAL_CORE_FILES: &[&str] = &[
    "core/webviewer-core.min.js",
    "core/CORSWorker.js",
    "core/DecryptWorker.js",
    "core/Worker.js",
];

/// A feature that ships its own folder under `core/`.
struct OptionalFeature {
    core_dir: &'static str,
    artifacts: &'static [(&'static str, &'static str)],
    resource_dirs: &'static [&'static str],
}

const CONTENT_EDIT: OptionalFeature = OptionalFeature {
    core_dir: "core/contentEdit",
    artifacts: CONTENT_EDIT_ARTIFACTS,
    resource_dirs: CONTENT_EDIT_RESOURCE_DIRS,
};

const OFFICE_EDITOR: OptionalFeature = OptionalFeature {
    core_dir: "core/officeEditor",
    artifacts: OFFICE_EDITOR_ARTIFACTS,
    resource_dirs: OFFICE_EDITOR_RESOURCE_DIRS,
};

const SPREADSHEET_EDITOR: OptionalFeature = OptionalFeature {
    core_dir: "core/spreadsheetEditor",
    artifacts: SPREADSHEET_EDITOR_ARTIFACTS,
    resource_dirs: SPREADSHEET_EDITOR_RESOURCE_DIRS,
};

/// Compute the file plan for `flags` against `layout`.
///
/// Pure: the filesystem is never consulted. Zip targets are only queued for
/// the archival packaging target, the only mode that produces archives.
pub fn compute_plan(flags: &FeatureFlags, layout: &DistributionLayout) -> FilePlan {
    let mut plan = FilePlan::default();
    let mut archives: Vec<PathBuf> = Vec::new();

    // The installed package has no top-level manifest or bundle.
    if !flags.installed_package {
        for file in ["package.json", "webviewer.min.js"] {
            plan.relocate_tree(layout.package_path(file), layout.resource_package_path(""));
        }
    }

    if flags.exclude_optimized_workers.is_yes() {
        plan.delete(layout.package_path("core/pdf/lean/optimized"));
        plan.delete(layout.package_path("core/pdf/full/optimized"));
    }

    let no_server = flags.web_viewer_server.is_no();
    if no_server && flags.convert_to_xod.is_no() {
        if flags.office.is_no() {
            delete_office_dirs(&mut plan, layout);
        } else {
            relocate_artifacts(&mut plan, layout, "core/office", OFFICE_ARTIFACTS);
            archives.extend(resource_dirs(layout, OFFICE_RESOURCE_DIRS));

            if flags.legacy_office.is_no() {
                plan.delete(layout.package_path("core/legacyOffice"));
            } else {
                relocate_artifacts(&mut plan, layout, "core/legacyOffice", LEGACY_OFFICE_ARTIFACTS);
                archives.extend(resource_dirs(layout, LEGACY_OFFICE_RESOURCE_DIRS));
            }
        }
    } else if no_server {
        // Documents are pre-converted; nothing is processed client side.
        delete_office_dirs(&mut plan, layout);
        plan.delete(layout.package_path("core/pdf"));
    }

    if flags.web_viewer_server.is_yes() {
        delete_office_dirs(&mut plan, layout);
    }

    if flags.full_api.is_no() {
        plan.delete(layout.package_path("core/pdf/full"));
        plan.relocate(
            layout.package_path("core/pdf/lean/optimized/PDFNetCWasm.br.js.mem"),
            layout.resource_path("pdf_lean/lean/optimized"),
        );
        plan.relocate(
            layout.package_path("core/pdf/lean/PDFNetC.br.mem"),
            layout.resource_path("resource/lean"),
        );
        archives.push(layout.resource_path("pdf_lean"));
    } else {
        plan.delete(layout.package_path("core/pdf/lean"));

        let debug_entry = layout.package_path("core/pdf/PDFNet.js");
        let prod_entry = layout.package_path("core/pdf/PDFNet.prod.js");
        if flags.pdfnet_prod.is_yes() {
            plan.remove_sync(debug_entry.clone());
            plan.rename(prod_entry, debug_entry);
        } else {
            plan.remove_sync(prod_entry);
        }

        plan.relocate(
            layout.package_path("core/pdf/full/optimized/PDFNetCWasm.br.js.mem"),
            layout.resource_path("pdf_full/full/optimized"),
        );
        plan.relocate(
            layout.package_path("core/pdf/full/PDFNetC.br.mem"),
            layout.resource_path("resource/full"),
        );
        archives.push(layout.resource_path("pdf_full"));
    }

    for (enabled, feature) in [
        (flags.content_edit.is_yes(), &CONTENT_EDIT),
        (flags.office_editor.is_yes(), &OFFICE_EDITOR),
        (flags.spreadsheet_editor.is_yes(), &SPREADSHEET_EDITOR),
    ] {
        if enabled {
            relocate_artifacts(&mut plan, layout, feature.core_dir, feature.artifacts);
            archives.extend(resource_dirs(layout, feature.resource_dirs));
        } else {
            plan.delete(layout.package_path(feature.core_dir));
        }
    }

    let archival = flags.salesforce.is_yes();
    if archival {
        plan.relocate(
            layout.package_path("ui/assets/fonts"),
            layout.resource_path("font_assets"),
        );
        archives.push(layout.resource_path("font_assets"));

        // The packaged UI ships without fonts; they live in font_assets.
        plan.delete_matching_after_relocation(
            "*.ttf",
            layout.resource_package_path("ui/assets/fonts/webfonts"),
        );
        plan.delete_matching_after_relocation(
            "*.woff*",
            layout.resource_package_path("ui/assets/fonts"),
        );

        add_archival_bundle(&mut plan, layout);
        archives.push(layout.resource_path("resource"));
        archives.push(layout.resource_path("external"));
        archives.push(layout.resource_package_path(""));
    } else {
        plan.relocate_tree(
            layout.package_path("core/external"),
            layout.resource_package_path("core"),
        );
    }

    if flags.source_map.is_no() || archival {
        plan.delete(layout.package_path("ui/webviewer-ui.min.js.map"));
        plan.delete(layout.package_path("ui/style.css.map"));
        plan.delete_matching("*.js.map", layout.package_path("ui/chunks"));
    }

    if flags.web_component.is_yes() {
        plan.delete(layout.package_path("ui/index.html"));
    } else {
        plan.delete(layout.package_path("ui/index-wc.html"));
    }

    if archival {
        for source in archives {
            plan.zip(source);
        }
    }

    plan
}

fn delete_office_dirs(plan: &mut FilePlan, layout: &DistributionLayout) {
    plan.delete(layout.package_path("core/office"));
    plan.delete(layout.package_path("core/legacyOffice"));
}

fn relocate_artifacts(
    plan: &mut FilePlan,
    layout: &DistributionLayout,
    core_dir: &str,
    artifacts: &[(&str, &str)],
) {
    for (file, resource_dir) in artifacts {
        plan.relocate(
            layout.package_path(&format!("{core_dir}/{file}")),
            layout.resource_path(resource_dir),
        );
    }
}

fn resource_dirs(layout: &DistributionLayout, dirs: &[&str]) -> Vec<PathBuf> {
    dirs.iter().map(|dir| layout.resource_path(dir)).collect()
}

/// Files every archival bundle carries regardless of feature selection.
fn add_archival_bundle(plan: &mut FilePlan, layout: &DistributionLayout) {
    plan.relocate(
        layout.package_path("core/pdf/pdfnet.res"),
        layout.resource_path("resource"),
    );
    plan.relocate(
        layout.package_path("core/pdf/PDFworker.js"),
        layout.resource_path("resource"),
    );
    plan.relocate_tree(
        layout.package_path("core/external"),
        layout.resource_dir().to_path_buf(),
    );
    plan.relocate_tree(
        layout.package_path("core/assets"),
        layout.resource_package_path("core"),
    );
    plan.relocate_tree(
        layout.package_path("core/pdf/PDFNet.js"),
        layout.resource_package_path("core/pdf"),
    );
    for file in ARCHIVAL_CORE_FILES {
        plan.relocate_tree(layout.package_path(file), layout.resource_package_path("core"));
    }
    plan.relocate_tree(layout.package_path("ui"), layout.resource_package_path(""));
}
