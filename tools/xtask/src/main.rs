//! # xtask - 开发辅助工具
//!
//! 提供本地质量门禁与开发辅助命令。
//!
//! ## 命令
//!
//! - `check-all`: 运行 fmt、clippy、test（含全部 feature）
//! - `cov`: 运行 slide-transition 覆盖率
//! - `settings-check`: 检查过渡配置文件（JSON 语法、字段校验）

use std::path::{Path, PathBuf};
use std::process::{Command, ExitCode};

use slide_transition::{SettingsError, TransitionSettings};
use walkdir::WalkDir;

/// 步骤标签，例如 `cargo fmt --all -- --check`
fn step_label(args: &[&str]) -> String {
    std::iter::once("cargo")
        .chain(args.iter().copied())
        .collect::<Vec<_>>()
        .join(" ")
}

/// 运行一条 cargo 命令，失败即中止后续步骤
fn cargo(args: &[&str]) -> anyhow::Result<()> {
    let step = step_label(args);
    eprintln!("\n==> {step}");
    let status = Command::new("cargo").args(args).status()?;
    anyhow::ensure!(status.success(), "{step} failed with {status}");
    Ok(())
}

/// 检查 cargo 子命令是否已安装
fn require_cargo_subcommand(sub: &str, install_hint: &str) -> anyhow::Result<()> {
    let installed = Command::new("cargo")
        .args([sub, "--version"])
        .status()
        .is_ok_and(|s| s.success());
    anyhow::ensure!(installed, "cargo {sub} 不可用。\n请先安装：\n{install_hint}\n然后重试。");
    Ok(())
}

fn main() -> ExitCode {
    match real_main() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("xtask error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

fn real_main() -> anyhow::Result<()> {
    let mut args = std::env::args().skip(1);
    let sub = args.next().unwrap_or_else(|| "help".to_string());

    match sub.as_str() {
        "check-all" => {
            cargo(&["fmt", "--all", "--", "--check"])?;
            cargo(&["clippy", "--workspace", "--all-targets", "--all-features"])?;
            cargo(&["test", "--workspace", "--features", "slide-transition/tokio"])?;
        }
        "cov" => {
            require_cargo_subcommand(
                "llvm-cov",
                "  - cargo install cargo-llvm-cov\n  - rustup component add llvm-tools-preview",
            )?;
            cargo(&["llvm-cov", "-p", "slide-transition", "--features", "tokio", "--html"])?;
            eprintln!("\nCoverage HTML: target/llvm-cov/html/index.html");
        }
        "settings-check" => {
            let path = args.next();
            settings_check(path.as_deref())?;
        }
        "help" | "-h" | "--help" => {
            print_help();
        }
        other => anyhow::bail!("unknown xtask subcommand: {other}"),
    }

    Ok(())
}

fn print_help() {
    eprintln!(
        r#"xtask - 开发辅助工具

USAGE:
  cargo xtask <command>

COMMANDS:
  check-all       运行 fmt、clippy、test 门禁检查
  cov             运行 slide-transition 覆盖率报告
  settings-check  检查过渡配置文件

SETTINGS-CHECK:
  cargo xtask settings-check [path]

  不带参数：检查 config/ 下所有 .json 文件
  带路径参数：检查指定文件或目录

  检查内容：
    - JSON 语法错误
    - 缓动函数为空或包含 ';'
"#
    );
}

//=============================================================================
// settings-check 命令实现
//=============================================================================

/// 默认配置目录（相对于 workspace root）
const DEFAULT_SETTINGS_DIR: &str = "config";

/// 执行配置检查
fn settings_check(path: Option<&str>) -> anyhow::Result<()> {
    let root = PathBuf::from(path.unwrap_or(DEFAULT_SETTINGS_DIR));

    let files = if root.is_file() {
        vec![root]
    } else if root.is_dir() {
        collect_settings_files(&root)?
    } else {
        anyhow::bail!(
            "路径不存在: {}\n请在 workspace 根目录运行，或指定配置路径",
            root.display()
        );
    };

    if files.is_empty() {
        eprintln!("未找到配置文件（.json）");
        return Ok(());
    }

    eprintln!("==> 检查 {} 个配置文件...\n", files.len());

    let mut errors = 0;
    for file in &files {
        match TransitionSettings::try_load(file) {
            Ok(settings) => eprintln!(
                "[OK] {}: {}ms / rewind {}ms / {}",
                file.display(),
                settings.animation_duration,
                settings.rewind_duration,
                settings.animation_timing_func
            ),
            Err(e) => {
                errors += 1;
                let level = match e {
                    SettingsError::Io(_) => "IO",
                    SettingsError::Parse(_) => "PARSE",
                    SettingsError::Validation { .. } => "INVALID",
                };
                eprintln!("[ERROR:{level}] {}: {e}", file.display());
            }
        }
    }

    eprintln!("─────────────────────────────────────────────────────");
    if errors > 0 {
        eprintln!("❌ {} 个文件中 {} 个有错误", files.len(), errors);
        anyhow::bail!("配置检查发现错误");
    }

    eprintln!("✅ 检查通过，无错误");
    Ok(())
}

/// 收集目录下的所有 JSON 文件
fn collect_settings_files(dir: &Path) -> anyhow::Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in WalkDir::new(dir) {
        let entry = entry?;
        if entry.file_type().is_file() && entry.path().extension().is_some_and(|ext| ext == "json")
        {
            files.push(entry.into_path());
        }
    }
    files.sort();
    Ok(files)
}
