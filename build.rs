fn main() {
    // Propagate TODO_INDICATOR_VERSION to the main build via cargo:rustc-env
    if let Ok(version) = std::env::var("TODO_INDICATOR_VERSION") {
        println!("cargo:rustc-env=TODO_INDICATOR_VERSION={}", version);
    }

    #[cfg(target_os = "windows")]
    {
        let mut res = winresource::WindowsResource::new();
        res.set("ProductName", "todo-indicator");
        res.set("FileDescription", "System tray indicator for todo.txt");

        let version = std::env::var("TODO_INDICATOR_VERSION")
            .unwrap_or_else(|_| env!("CARGO_PKG_VERSION").to_string());

        // VERSIONINFO packs major.minor.patch.build into four 16-bit fields
        let mut parts = version
            .split('.')
            .map(|s| s.parse::<u16>().unwrap_or(0))
            .chain(std::iter::repeat(0));
        let (major, minor, patch) = (
            parts.next().unwrap_or(0),
            parts.next().unwrap_or(0),
            parts.next().unwrap_or(0),
        );
        let version_u64 = (major as u64) << 48 | (minor as u64) << 32 | (patch as u64) << 16;
        res.set_version_info(winresource::VersionInfo::PRODUCTVERSION, version_u64);
        res.set_version_info(winresource::VersionInfo::FILEVERSION, version_u64);
        res.set("ProductVersion", &version);
        res.set("FileVersion", &version);

        // Run as the invoking user, never elevated
        res.set_manifest(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<assembly xmlns="urn:schemas-microsoft-com:asm.v1" manifestVersion="1.0">
  <trustInfo xmlns="urn:schemas-microsoft-com:asm.v3">
    <security>
      <requestedPrivileges>
        <requestedExecutionLevel level="asInvoker" uiAccess="false"/>
      </requestedPrivileges>
    </security>
  </trustInfo>
</assembly>"#,
        );

        res.compile()
            .expect("Failed to compile Windows resources");
    }
}
