/*
 * Copyright 2020 Nikhil Marathe <nsm.nikhil@gmail.com>
 *
 * Licensed under the Apache License, Version 2.0 (the "License");
 * you may not use this file except in compliance with the License.
 * You may obtain a copy of the License at
 *
 *     http://www.apache.org/licenses/LICENSE-2.0
 *
 * Unless required by applicable law or agreed to in writing, software
 * distributed under the License is distributed on an "AS IS" BASIS,
 * WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
 * See the License for the specific language governing permissions and
 * limitations under the License.
 */

//! What the generated Makefile builds when nothing is overridden: the tflite-micro runtime and
//! its header-only dependencies, linked with the `.cpp` files of the working directory.

/// Header search roots, in priority order.
pub const INCLUDE_ROOTS: &[&str] = &[
    "tflite-micro/",
    "flatbuffers/include/",
    "gemmlowp/",
    "ruy/",
];

/// Sources every build needs, whether or not they have been fetched yet.
pub const SOURCES: &[&str] = &[
    "tflite-micro/tensorflow/lite/micro/arena_allocator/recording_single_arena_buffer_allocator.cc",
    "tflite-micro/tensorflow/lite/micro/arena_allocator/non_persistent_arena_buffer_allocator.cc",
    "tflite-micro/tensorflow/lite/micro/arena_allocator/persistent_arena_buffer_allocator.cc",
    "tflite-micro/tensorflow/lite/micro/arena_allocator/single_arena_buffer_allocator.cc",
    "tflite-micro/tensorflow/lite/micro/tflite_bridge/flatbuffer_conversions_bridge.cc",
    "tflite-micro/tensorflow/lite/micro/memory_planner/greedy_memory_planner.cc",
    "tflite-micro/tensorflow/lite/micro/memory_planner/linear_memory_planner.cc",
    "tflite-micro/tensorflow/lite/micro/tflite_bridge/micro_error_reporter.cc",
    "tflite-micro/tensorflow/lite/kernels/internal/portable_tensor_utils.cc",
    "tflite-micro/tensorflow/compiler/mlir/lite/core/api/error_reporter.cc",
    "tflite-micro/tensorflow/lite/micro/kernels/fully_connected_common.cc",
    "tflite-micro/tensorflow/lite/kernels/internal/quantization_util.cc",
    "tflite-micro/tensorflow/compiler/mlir/lite/schema/schema_utils.cc",
    "tflite-micro/tensorflow/lite/core/api/flatbuffer_conversions.cc",
    "tflite-micro/tensorflow/lite/micro/micro_interpreter_context.cc",
    "tflite-micro/tensorflow/lite/micro/kernels/leaky_relu_common.cc",
    "tflite-micro/tensorflow/lite/micro/recording_micro_allocator.cc",
    "tflite-micro/tensorflow/lite/micro/kernels/dequantize_common.cc",
    "tflite-micro/tensorflow/lite/kernels/internal/tensor_ctypes.cc",
    "tflite-micro/tensorflow/lite/micro/kernels/fully_connected.cc",
    "tflite-micro/tensorflow/lite/micro/kernels/quantize_common.cc",
    "tflite-micro/tensorflow/lite/micro/micro_interpreter_graph.cc",
    "tflite-micro/tensorflow/lite/micro/micro_resource_variable.cc",
    "tflite-micro/tensorflow/lite/micro/kernels/reshape_common.cc",
    "tflite-micro/tensorflow/lite/micro/micro_allocation_info.cc",
    "tflite-micro/tensorflow/lite/micro/kernels/conv_common.cc",
    "tflite-micro/tensorflow/lite/micro/kernels/kernel_util.cc",
    "tflite-micro/tensorflow/lite/micro/kernels/dequantize.cc",
    "tflite-micro/tensorflow/lite/micro/kernels/leaky_relu.cc",
    "tflite-micro/tensorflow/lite/kernels/internal/common.cc",
    "tflite-micro/tensorflow/lite/micro/kernels/transpose.cc",
    "tflite-micro/tensorflow/lite/micro/micro_interpreter.cc",
    "tflite-micro/tensorflow/lite/micro/micro_op_resolver.cc",
    "tflite-micro/tensorflow/lite/micro/flatbuffer_utils.cc",
    "tflite-micro/tensorflow/lite/micro/kernels/quantize.cc",
    "tflite-micro/tensorflow/lite/micro/kernels/reshape.cc",
    "tflite-micro/tensorflow/lite/micro/micro_allocator.cc",
    "tflite-micro/tensorflow/lite/micro/memory_helpers.cc",
    "tflite-micro/tensorflow/lite/kernels/kernel_util.cc",
    "tflite-micro/tensorflow/lite/micro/micro_context.cc",
    "tflite-micro/tensorflow/lite/micro/kernels/conv.cc",
    "tflite-micro/tensorflow/lite/micro/micro_utils.cc",
    "tflite-micro/tensorflow/lite/micro/debug_log.cc",
    "tflite-micro/tensorflow/lite/micro/micro_log.cc",
    "tflite-micro/tensorflow/lite/core/c/common.cc",
    "tflite-micro/tensorflow/lite/array.cc",
];

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn no_duplicate_sources() {
        let unique: HashSet<&&str> = SOURCES.iter().collect();
        assert_eq!(unique.len(), SOURCES.len());
    }

    #[test]
    fn sources_live_under_an_include_root() {
        for source in SOURCES {
            assert!(
                INCLUDE_ROOTS.iter().any(|root| source.starts_with(root)),
                "{} is outside every include root",
                source
            );
        }
    }
}
