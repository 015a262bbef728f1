use anyhow::Result;
use insta_cmd::assert_cmd_snapshot;

use crate::CliTest;

const PAGE: &str = r#"<!DOCTYPE html>
<html>
  <body>
    <nav>
      <a href="/">Home</a><!-- link -->
    </nav><!-- navbar --><!-- position: sticky; top: 0 -->
    <p>Intro</p>
    <!-- // note for editors -->
  </body>
</html>
"#;

#[test]
fn test_build_default_directory() -> Result<()> {
    let test = CliTest::with_files(&[
        ("olive_src/index.html", PAGE),
        ("olive_src/css/site.css", "nav { display: flex }\n"),
    ])?;

    assert_cmd_snapshot!(test.build_command(), @r"
    success: true
    exit_code: 0
    ----- stdout -----
    ✓ olive_src -> src: 1 transformed, 1 copied

    ----- stderr -----
    ");

    let page = test.read_file("src/index.html")?;
    assert!(page.contains(r#"<nav class="navbar" style="position: sticky; top: 0">"#));
    assert!(page.contains(r#"<a href="/" class="link">Home</a>"#));
    assert!(page.contains("<!-- // note for editors -->"));
    assert_eq!(test.read_file("src/css/site.css")?, "nav { display: flex }\n");

    Ok(())
}

#[test]
fn test_build_every_host() -> Result<()> {
    let test = CliTest::with_files(&[
        (
            "_app/App.vue",
            "<template>\n  <div><span>Hi</span><!-- badge --></div>\n</template>\n",
        ),
        ("_app/Nav.svelte", "<!-- nav -->\n<nav>{#if open}<ul></ul>{/if}</nav>\n"),
        ("_app/index.astro", "---\nconst t = 'x';\n---\n<h1>{t}</h1><!-- title -->\n"),
        ("_app/card.ts", "const t = html`<div></div><!-- card -->`;\n"),
        ("_app/Button.jsx", "export const B = () => <button>{/* btn */}</button>;\n"),
    ])?;

    let output = test.build_command().arg("_app").output()?;
    assert!(output.status.success());

    assert_eq!(
        test.read_file("app/App.vue")?,
        "<template>\n  <div><span class=\"badge\">Hi</span></div>\n</template>\n"
    );
    assert_eq!(
        test.read_file("app/Nav.svelte")?,
        "\n<nav class=\"nav\">{#if open}<ul></ul>{/if}</nav>\n"
    );
    assert_eq!(
        test.read_file("app/index.astro")?,
        "---\nconst t = 'x';\n---\n<h1 class=\"title\">{t}</h1>\n"
    );
    assert_eq!(
        test.read_file("app/card.ts")?,
        "const t = html`<div class=\"card\"></div>`;\n"
    );
    assert_eq!(
        test.read_file("app/Button.jsx")?,
        "export const B = () => <button className=\"btn\"></button>;\n"
    );

    Ok(())
}

#[test]
fn test_build_reports_failures_and_copies_original() -> Result<()> {
    let test = CliTest::with_files(&[
        ("site_/ok.html", "<p></p><!-- ok -->"),
        ("site_/broken.html", "<p>\n<!-- never closed"),
    ])?;

    assert_cmd_snapshot!(test.build_command().arg("site_"), @r"
    success: false
    exit_code: 1
    ----- stdout -----
    ✘ site_ -> site: 1 transformed, 1 failed

    ----- stderr -----
    error: site_/broken.html:2:1: parse error: unterminated comment
    ");

    assert_eq!(test.read_file("site/broken.html")?, "<p>\n<!-- never closed");
    assert_eq!(test.read_file("site/ok.html")?, r#"<p class="ok"></p>"#);

    Ok(())
}

#[test]
fn test_build_dry_run_writes_nothing() -> Result<()> {
    let test = CliTest::with_files(&[("olive_src/index.html", "<p></p><!-- lead -->")])?;

    assert_cmd_snapshot!(test.build_command().arg("--dry-run"), @r"
    success: true
    exit_code: 0
    ----- stdout -----
    ✓ olive_src -> src (dry run): 1 transformed

    ----- stderr -----
    ");
    assert!(!test.root().join("src").exists());

    Ok(())
}

#[test]
fn test_build_out_dir_and_config() -> Result<()> {
    let test = CliTest::with_files(&[
        (
            ".oliverc.json",
            r#"{ "ignores": ["drafts/**"], "jsxFramework": "solid", "copyUnsupported": false }"#,
        ),
        ("pages/App.tsx", "export const A = () => <main>{/* p-4 */}</main>;\n"),
        ("pages/drafts/wip.html", "<p></p><!-- wip -->"),
        ("pages/logo.svg", "<svg/>"),
    ])?;

    let output = test
        .build_command()
        .args(["pages", "--out-dir", "dist", "--verbose"])
        .output()?;
    assert!(output.status.success());
    let stdout = String::from_utf8(output.stdout)?;
    assert!(stdout.contains("transformed (1 comment) pages/App.tsx"));
    assert!(stdout.contains("skipped pages/logo.svg"));

    assert_eq!(
        test.read_file("dist/App.tsx")?,
        "export const A = () => <main class=\"p-4\"></main>;\n"
    );
    assert!(!test.root().join("dist/drafts").exists());
    assert!(!test.root().join("dist/logo.svg").exists());

    Ok(())
}

#[test]
fn test_build_rejects_bad_arguments() -> Result<()> {
    let test = CliTest::with_files(&[("olive_a/x.html", ""), ("olive_b/y.html", "")])?;

    assert_cmd_snapshot!(test.build_command().args(["olive_a", "olive_b", "--out-dir", "dist"]), @r"
    success: false
    exit_code: 2
    ----- stdout -----

    ----- stderr -----
    Error: --out-dir needs exactly one source directory
    ");

    assert_cmd_snapshot!(test.build_command(), @r"
    success: false
    exit_code: 2
    ----- stdout -----

    ----- stderr -----
    Error: No source directory found (looked for olive_src, _src, src_olive, src_)
    ");

    Ok(())
}
