mod common;
use common::*;

fn temp_path(name: &str) -> String {
    let mut path = std::env::temp_dir();
    path.push(format!("qbasic_test_{}_{}", std::process::id(), name));
    path.to_string_lossy().to_string()
}

fn cleanup(path: &str) {
    let _ = std::fs::remove_file(path);
}

#[test]
fn test_text_write_read_round_trip() {
    let path = temp_path("roundtrip.txt");
    let source = format!(
        "OPEN \"{p}\" FOR OUTPUT AS #1\n\
         PRINT #1, \"first line\"\n\
         CLOSE #1\n\
         OPEN \"{p}\" FOR INPUT AS #1\n\
         LINE INPUT #1, t$\n\
         CLOSE #1\n\
         PRINT t$",
        p = path
    );
    assert_eq!(run(&source), "first line\n");
    cleanup(&path);
}

#[test]
fn test_append_mode() {
    let path = temp_path("append.txt");
    let source = format!(
        "OPEN \"{p}\" FOR OUTPUT AS #1\nPRINT #1, \"one\"\nCLOSE #1\n\
         OPEN \"{p}\" FOR APPEND AS #1\nPRINT #1, \"two\"\nCLOSE #1\n\
         OPEN \"{p}\" FOR INPUT AS #1\n\
         LINE INPUT #1, a$\nLINE INPUT #1, b$\nCLOSE #1\n\
         PRINT a$; b$",
        p = path
    );
    assert_eq!(run(&source), "onetwo\n");
    cleanup(&path);
}

#[test]
fn test_input_file_fields() {
    let path = temp_path("fields.txt");
    let source = format!(
        "OPEN \"{p}\" FOR OUTPUT AS #1\n\
         PRINT #1, \"10, 20, hello\"\n\
         CLOSE #1\n\
         OPEN \"{p}\" FOR INPUT AS #1\n\
         INPUT #1, a, b, c$\n\
         CLOSE #1\n\
         PRINT a; b; c$",
        p = path
    );
    assert_eq!(run(&source), " 10  20 hello\n");
    cleanup(&path);
}

#[test]
fn test_eof_loop() {
    let path = temp_path("eof.txt");
    let source = format!(
        "OPEN \"{p}\" FOR OUTPUT AS #1\n\
         FOR i = 1 TO 3\nPRINT #1, i\nNEXT\n\
         CLOSE #1\n\
         OPEN \"{p}\" FOR INPUT AS #1\n\
         total = 0\n\
         DO WHILE NOT EOF(1)\n\
         LINE INPUT #1, l$\n\
         total = total + VAL(l$)\n\
         LOOP\n\
         CLOSE #1\n\
         PRINT total",
        p = path
    );
    assert_eq!(run(&source), " 6 \n");
    cleanup(&path);
}

#[test]
fn test_sum_from_standard_input() {
    let source = "DO WHILE NOT EOF(0)\n\
                  LINE INPUT #0, l$\n\
                  total = total + VAL(l$)\n\
                  LOOP\n\
                  PRINT total";
    assert_eq!(run_with_stdin(source, "10\n20\n30\n"), " 60 \n");
}

#[test]
fn test_binary_records_round_trip() {
    let path = temp_path("records.bin");
    let source = format!(
        "OPEN \"{p}\" FOR BINARY AS #1\n\
         i% = -12345\n\
         l& = 123456789\n\
         s! = 1.5\n\
         d# = 2.25\n\
         PUT #1, 1, i%\n\
         PUT #1, , l&\n\
         PUT #1, , s!\n\
         PUT #1, , d#\n\
         GET #1, 1, a%\n\
         GET #1, , b&\n\
         GET #1, , c!\n\
         GET #1, , e#\n\
         CLOSE #1\n\
         PRINT a%; b&; c!; e#",
        p = path
    );
    assert_eq!(run(&source), "-12345  123456789  1.5  2.25 \n");
    cleanup(&path);
}

#[test]
fn test_random_mode_records() {
    let path = temp_path("random.dat");
    let source = format!(
        "OPEN \"{p}\" FOR RANDOM AS #1 LEN = 16\n\
         r$ = \"alpha\"\n\
         PUT #1, 1, r$\n\
         r$ = \"beta\"\n\
         PUT #1, 2, r$\n\
         GET #1, 1, w$\n\
         GET #1, 2, x$\n\
         CLOSE #1\n\
         PRINT w$; \"|\"; x$",
        p = path
    );
    assert_eq!(run(&source), "alpha|beta\n");
    cleanup(&path);
}

#[test]
fn test_lof_and_loc() {
    let path = temp_path("lof.dat");
    let source = format!(
        "OPEN \"{p}\" FOR BINARY AS #1\n\
         d# = 0\n\
         PUT #1, 1, d#\n\
         PRINT LOF(1); LOC(1)\n\
         CLOSE #1",
        p = path
    );
    assert_eq!(run(&source), " 8  8 \n");
    cleanup(&path);
}

#[test]
fn test_seek_positions_are_one_based() {
    let path = temp_path("seek.dat");
    let source = format!(
        "OPEN \"{p}\" FOR BINARY AS #1\n\
         a% = 513\n\
         PUT #1, 1, a%\n\
         SEEK #1, 1\n\
         GET #1, , b%\n\
         CLOSE #1\n\
         PRINT b%",
        p = path
    );
    // 513 is 01 02 little-endian
    assert_eq!(run(&source), " 513 \n");
    cleanup(&path);
}

#[test]
fn test_freefile_and_reopen() {
    let path = temp_path("free.txt");
    let source = format!(
        "PRINT FREEFILE\n\
         OPEN \"{p}\" FOR OUTPUT AS #1\n\
         PRINT FREEFILE\n\
         CLOSE #1",
        p = path
    );
    assert_eq!(run(&source), " 1 \n 2 \n");
    cleanup(&path);
}

#[test]
fn test_reopening_in_use_number_fails() {
    let path = temp_path("dup.txt");
    let source = format!(
        "OPEN \"{p}\" FOR OUTPUT AS #1\n\
         OPEN \"{p}\" FOR OUTPUT AS #1",
        p = path
    );
    assert!(run(&source).starts_with("?I/O ERROR; FILE ALREADY OPEN"));
    cleanup(&path);
}

#[test]
fn test_close_all_and_unopened_handle() {
    let path = temp_path("closeall.txt");
    let source = format!(
        "OPEN \"{p}\" FOR OUTPUT AS #3\n\
         CLOSE\n\
         PRINT #3, \"x\"",
        p = path
    );
    assert!(run(&source).starts_with("?I/O ERROR; FILE NOT OPEN"));
    cleanup(&path);
}

#[test]
fn test_missing_input_file() {
    let path = temp_path("missing.txt");
    cleanup(&path);
    let source = format!("OPEN \"{p}\" FOR INPUT AS #1", p = path);
    assert!(run(&source).starts_with("?I/O ERROR; FILE NOT FOUND"));
}

#[test]
fn test_eof_reports_dialect_booleans() {
    let path = temp_path("eofbool.txt");
    let source = format!(
        "OPEN \"{p}\" FOR OUTPUT AS #1\nPRINT #1, \"x\"\nCLOSE #1\n\
         OPEN \"{p}\" FOR INPUT AS #1\n\
         PRINT EOF(1)\n\
         LINE INPUT #1, l$\n\
         PRINT EOF(1)\n\
         CLOSE #1",
        p = path
    );
    assert_eq!(run(&source), " 0 \n-1 \n");
    cleanup(&path);
}
