fn main() {
    #[cfg(windows)]
    {
        use std::env;
        use std::path::PathBuf;

        let Ok(manifest_dir) = env::var("CARGO_MANIFEST_DIR") else {
            return;
        };
        let ico_path = PathBuf::from(&manifest_dir)
            .join("resources")
            .join("installer-icon.ico");

        // 아이콘이 없으면 리소스 없이 빌드
        if let Some(ico) = ico_path.to_str().filter(|_| ico_path.exists()) {
            let mut res = winres::WindowsResource::new();
            res.set_icon(ico);
            res.set("ProductName", "CET Easy Install");
            res.set("FileDescription", "Cyber Engine Tweaks installer for Cyberpunk 2077");

            if let Err(e) = res.compile() {
                println!("cargo:warning=Failed to compile resources: {}", e);
            }
        } else {
            println!(
                "cargo:warning=Icon file not found. Place installer-icon.ico in the resources directory"
            );
        }
    }
}
