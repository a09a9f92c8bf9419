//! Build script for mdtohtml
//!
//! Windows: embeds the application manifest, which
//! - opts into Common Controls v6 so message boxes use the themed style
//! - declares per-monitor DPI awareness so dialog text is not blurred
//! - sets `longPathAware` for markdown files below deeply nested folders
//!
//! On non-Windows platforms the script does nothing.

fn main() {
    #[cfg(windows)]
    {
        // The .rc file references the manifest as an RT_MANIFEST resource
        embed_resource::compile("mdtohtml.rc", embed_resource::NONE);

        println!("cargo:rerun-if-changed=mdtohtml.rc");
        println!("cargo:rerun-if-changed=mdtohtml.manifest");
    }
}
